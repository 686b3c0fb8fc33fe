//! `Write` tool — creates or overwrites files.
//!
//! Auto-creates parent directories. Reports byte count, whether the file
//! was newly created or overwritten.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tron_core::tools::{Tool, ToolCategory, ToolParameterSchema, TronToolResult, text_result};

use crate::errors::ToolError;
use crate::traits::{FileSystemOps, ToolContext, TronTool};
use crate::utils::fs_errors::format_fs_error;
use crate::utils::path::resolve_path;
use crate::utils::validation::{validate_path_not_root, validate_required_string};

/// The `Write` tool creates or overwrites files.
pub struct WriteTool {
    fs: Arc<dyn FileSystemOps>,
}

impl WriteTool {
    /// Create a new `Write` tool with the given filesystem.
    pub fn new(fs: Arc<dyn FileSystemOps>) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl TronTool for WriteTool {
    fn name(&self) -> &str {
        "Write"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Filesystem
    }

    fn definition(&self) -> Tool {
        Tool {
            name: "Write".into(),
            description: "Write content to a file. Creates the file if it doesn't exist, overwrites if it does.".into(),
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: Some({
                    let mut m = serde_json::Map::new();
                    let _ = m.insert(
                        "file_path".into(),
                        json!({"type": "string", "description": "The path to the file to write"}),
                    );
                    let _ = m.insert(
                        "content".into(),
                        json!({"type": "string", "description": "The content to write to the file"}),
                    );
                    m
                }),
                required: Some(vec!["file_path".into(), "content".into()]),
                description: None,
                extra: serde_json::Map::new(),
            },
        }
    }

    async fn execute(
        &self,
        params: Value,
        ctx: &ToolContext,
    ) -> Result<TronToolResult, ToolError> {
        let file_path = match validate_required_string(&params, "file_path", "path to the file") {
            Ok(p) => p,
            Err(e) => return Ok(e),
        };

        if let Err(e) = validate_path_not_root(&file_path, "file_path") {
            return Ok(e);
        }

        let content = match params.get("content") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => {
                return Ok(text_result(
                    "Missing required parameter: content (the content to write)",
                    true,
                ));
            }
            _ => {
                return Ok(text_result(
                    "Invalid type for parameter: content (expected string)",
                    true,
                ));
            }
        };

        let resolved = resolve_path(&file_path, &ctx.working_directory);
        let existed = self.fs.exists(&resolved);

        // Create parent directories
        if let Some(parent) = resolved.parent() {
            if let Err(e) = self.fs.create_dir_all(parent).await {
                return Ok(format_fs_error(&e, &parent.to_string_lossy(), "creating directory"));
            }
        }

        let bytes = content.as_bytes();
        if let Err(e) = self.fs.write_file(&resolved, bytes).await {
            return Ok(format_fs_error(&e, &resolved.to_string_lossy(), "writing"));
        }

        let bytes_written = bytes.len();
        let message = if existed {
            format!(
                "Wrote {} bytes to {} (overwritten)",
                bytes_written,
                resolved.display()
            )
        } else {
            format!(
                "Wrote {} bytes to {} (created)",
                bytes_written,
                resolved.display()
            )
        };

        let details = json!({
            "filePath": resolved.to_string_lossy(),
            "bytesWritten": bytes_written,
            "created": !existed,
        });

        Ok(TronToolResult {
            content: tron_core::tools::ToolResultBody::Blocks(vec![
                tron_core::content::ToolResultContent::text(message),
            ]),
            details: Some(details),
            is_error: None,
            stop_turn: None,
        })
    }
}
