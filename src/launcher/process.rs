//! Application process supervision

use log::{info, warn};
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use tokio::process::Command;

use crate::error::LaunchError;
use crate::launcher::plan::LaunchPlan;

/// Start the application and wait for it to exit.
///
/// The child inherits stdio and the working directory. Ctrl-C kills the child.
/// Returns the child's exit code, or 128 + signal number if it was killed.
pub async fn launch(plan: &LaunchPlan) -> Result<i32, LaunchError> {
    let mut command = Command::new(&plan.program);
    command
        .args(&plan.args)
        .envs(plan.env.iter().map(|(k, v)| (k, v)))
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .map_err(|e| LaunchError::Spawn(plan.program.clone(), e))?;
    info!("Launched `{}` (pid {:?})", plan, child.id());

    let status = tokio::select! {
        status = child.wait() => status.map_err(LaunchError::Wait)?,
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("Interrupt received, stopping application");
            if let Err(e) = child.start_kill() {
                warn!("Failed to signal application: {}", e);
            }
            child.wait().await.map_err(LaunchError::Wait)?
        }
    };

    let code = exit_code(status);
    info!("Application exited with status {}", code);
    Ok(code)
}

fn exit_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn shell(script: &str, env: Vec<(String, OsString)>) -> LaunchPlan {
        LaunchPlan {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            env,
        }
    }

    #[tokio::test]
    async fn returns_child_exit_code() {
        assert_eq!(launch(&shell("exit 3", Vec::new())).await.unwrap(), 3);
        assert_eq!(launch(&shell("true", Vec::new())).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn child_sees_exported_environment() {
        let plan = shell(
            r#"test "$GRADIO_TEMP_DIR" = /data/gradio_tmp"#,
            vec![("GRADIO_TEMP_DIR".to_string(), OsString::from("/data/gradio_tmp"))],
        );
        assert_eq!(launch(&plan).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn killed_child_maps_to_signal_code() {
        assert_eq!(launch(&shell("kill -9 $$", Vec::new())).await.unwrap(), 137);
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let plan = LaunchPlan {
            program: "/nonexistent/app-launcher".to_string(),
            args: Vec::new(),
            env: Vec::new(),
        };
        assert!(matches!(launch(&plan).await, Err(LaunchError::Spawn(_, _))));
    }
}
