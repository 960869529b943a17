//! User facing output
//!
//! Documents are printed to stdout; status messages go to stderr and honor the
//! quiet and verbose switches.

use crate::config::OutputFormat;
use crate::error::{PullSecretError, Result};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Clone, Debug)]
pub struct OutputManager {
    pub verbose: bool,
    quiet: bool,
}

impl OutputManager {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            quiet: false,
        }
    }

    pub fn new_quiet() -> Self {
        Self {
            verbose: false,
            quiet: true,
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("ℹ️  {}", message);
        }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            eprintln!("✅ {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            eprintln!("⚠️  WARNING: {}", message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("❌ ERROR: {}", message);
    }

    /// Detailed information (only shown in verbose mode)
    pub fn detail(&self, message: &str) {
        if self.verbose && !self.quiet {
            eprintln!("   {}", message);
        }
    }

    /// Print a document to stdout in the requested format
    pub fn print_document<T: Serialize>(&self, document: &T, format: OutputFormat) -> Result<()> {
        let rendered = render(document, format)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        if !rendered.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
        Ok(())
    }
}

pub fn render<T: Serialize>(document: &T, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(document)
            .map_err(|e| PullSecretError::Serialization(e.to_string()))?,
        OutputFormat::Yaml => serde_yaml::to_string(document)?,
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_render_formats() {
        let document = BTreeMap::from([("app.username", "u")]);
        assert_eq!(
            render(&document, OutputFormat::Json).unwrap(),
            "{\n  \"app.username\": \"u\"\n}"
        );
        assert_eq!(render(&document, OutputFormat::Yaml).unwrap(), "app.username: u\n");
    }
}
