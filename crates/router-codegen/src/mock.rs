//! Mock code generator for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{CodeGenerator, CodegenError};

/// Generates a fixed-shape snippet without any network call, or always
/// fails when built with [`MockCodeGenerator::failing`].
#[derive(Debug, Default)]
pub struct MockCodeGenerator {
    fail: bool,
    calls: AtomicUsize,
}

impl MockCodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodeGenerator for MockCodeGenerator {
    async fn generate(&self, action_id: &str) -> Result<String, CodegenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CodegenError::ApiError("mock failure".to_string()));
        }
        Ok(format!(
            "from function_registry import {action_id}\n\n\
             def main():\n    \
             try:\n        print({action_id}())\n    \
             except Exception as e:\n        print(f\"Error: {{e}}\")"
        ))
    }
}
