use crate::traits::Clipboard;
use crate::ClipboardError;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Pipes text into the first clipboard tool that can be spawned.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    tools: Vec<(String, Vec<String>)>,
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::with_tools(&[
            ("wl-copy", &[]),
            ("xclip", &["-selection", "clipboard"]),
            ("pbcopy", &[]),
        ])
    }
}

impl SystemClipboard {
    pub fn with_tools(tools: &[(&str, &[&str])]) -> Self {
        Self {
            tools: tools
                .iter()
                .map(|(program, args)| {
                    (
                        program.to_string(),
                        args.iter().map(|arg| arg.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    async fn pipe_into(program: &str, args: &[String], text: &str) -> Result<(), ClipboardError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(ClipboardError::Failed {
                tool: program.to_string(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        for (program, args) in &self.tools {
            match Self::pipe_into(program, args, text).await {
                Ok(()) => return Ok(()),
                Err(ClipboardError::Io(error)) if error.kind() == std::io::ErrorKind::NotFound => {
                    debug!(tool = %program, "clipboard tool not installed");
                }
                Err(error) => return Err(error),
            }
        }

        let tried = self
            .tools
            .iter()
            .map(|(program, _)| program.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(ClipboardError::Unavailable(tried))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_tools_report_unavailable() {
        let clipboard = SystemClipboard::with_tools(&[("fdd-no-such-clipboard-tool", &[])]);
        let error = clipboard.copy("Q1").await.unwrap_err();
        assert!(
            matches!(error, ClipboardError::Unavailable(tried) if tried == "fdd-no-such-clipboard-tool")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn first_working_tool_wins() {
        let clipboard = SystemClipboard::with_tools(&[
            ("fdd-no-such-clipboard-tool", &[]),
            ("sh", &["-c", "cat > /dev/null"]),
        ]);
        assert!(clipboard.copy("What drove revenue?").await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_is_reported() {
        let clipboard = SystemClipboard::with_tools(&[("sh", &["-c", "cat > /dev/null; exit 3"])]);
        let error = clipboard.copy("x").await.unwrap_err();
        assert!(matches!(error, ClipboardError::Failed { tool, .. } if tool == "sh"));
    }
}
