use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match decision_jar::cli::run_with_args(std::env::args_os()).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string()));
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            match serde_json::to_string_pretty(&e) {
                Ok(body) => eprintln!("{}", body),
                Err(_) => eprintln!("{}", e),
            }
            // 1: the request can be fixed by the user, 2: retry or report
            if e.is_user_facing() {
                ExitCode::from(1)
            } else {
                ExitCode::from(2)
            }
        }
    }
}
