//! FILENAME: app/src/main.rs

fn main() -> anyhow::Result<()> {
    sheet_cli_lib::cli::main()
}
