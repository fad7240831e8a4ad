//! Tool availability detection

use std::process::Command;

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub version: Option<String>,
    pub available: bool,
}

/// Check whether `program --version` runs successfully
pub fn check_tool(program: &str) -> ToolInfo {
    let output = Command::new(program).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            ToolInfo {
                name: program.to_string(),
                version: Some(version),
                available: true,
            }
        }
        _ => ToolInfo {
            name: program.to_string(),
            version: None,
            available: false,
        },
    }
}
