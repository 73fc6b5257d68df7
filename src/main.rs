use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    repotrack::app::startup::startup().await
}
