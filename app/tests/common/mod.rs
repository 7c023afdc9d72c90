//! FILENAME: tests/common/mod.rs
//! Test harness for sheet-cli integration tests.

use engine::{EdgePolicy, Sheet, SheetConfig};
use sheet_cli_lib::Shell;

/// Test harness wrapping a shell and everything it printed.
pub struct TestHarness {
    pub shell: Shell,
    pub output: Vec<u8>,
    pub failures: usize,
}

impl TestHarness {
    /// Create a harness with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SheetConfig::default())
    }

    /// Create a harness whose sheet uses the legacy edge bookkeeping.
    pub fn legacy() -> Self {
        Self::with_config(SheetConfig {
            edge_policy: EdgePolicy::Legacy,
        })
    }

    pub fn with_config(config: SheetConfig) -> Self {
        TestHarness {
            shell: Shell::new(config),
            output: Vec::new(),
            failures: 0,
        }
    }

    /// Runs a multi-line script and returns only the output it produced.
    pub fn run(&mut self, script: &str) -> String {
        let start = self.output.len();
        self.failures += self
            .shell
            .run(script.as_bytes(), &mut self.output)
            .unwrap();
        String::from_utf8(self.output[start..].to_vec()).unwrap()
    }

    pub fn sheet(&self) -> &Sheet {
        self.shell.sheet()
    }
}
