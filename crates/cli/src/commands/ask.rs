use medstock_agent::{DefaultAgent, SessionId};
use medstock_db::SqlInventoryRepository;

use crate::commands::{
    build_runtime, init_stderr_logging, load_config, open_database, CommandResult,
};

/// One-shot question. Each invocation is its own single-turn session; use
/// `chat` for a conversation that carries context.
pub fn run(text: &str) -> CommandResult {
    if text.trim().is_empty() {
        return CommandResult::failure("ask", "invalid_input", "message must not be empty", 2);
    }

    let config = match load_config("ask") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    init_stderr_logging(&config);
    let runtime = match build_runtime("ask") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let agent = DefaultAgent::from_config(&config, SqlInventoryRepository::new(pool.clone()));
        let reply = agent.process_utterance(&SessionId::new("cli-ask"), text).await;
        pool.close().await;
        Ok::<String, crate::commands::StepFailure>(reply)
    });

    match result {
        Ok(reply) => CommandResult::success("ask", reply),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("ask", error_class, message, exit_code)
        }
    }
}
