use chrono::NaiveDate;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use medstock_agent::{DefaultAgent, SessionId};
use medstock_core::clock::{Clock, SystemClock};
use medstock_core::store::InventoryStore;
use medstock_db::{DemoInventory, InMemoryInventoryRepository, SqlInventoryRepository};

use crate::commands::{
    build_runtime, init_stderr_logging, load_config, open_database, CommandResult, StepFailure,
};

const EXIT_WORDS: &[&str] = &["exit", "quit", "bye"];

pub fn run(session: Option<&str>, memory: bool) -> CommandResult {
    let config = match load_config("chat") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    init_stderr_logging(&config);
    let runtime = match build_runtime("chat") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let session_id = session
        .map(SessionId::new)
        .unwrap_or_else(|| SessionId::new(uuid::Uuid::new_v4().to_string()));

    let result = runtime.block_on(async {
        if memory {
            let agent = DefaultAgent::from_config(&config, demo_store(SystemClock.today())?);
            return converse_on_stdio(&agent, &session_id).await;
        }

        let pool = open_database(&config).await?;
        let agent = DefaultAgent::from_config(&config, SqlInventoryRepository::new(pool.clone()));
        let turns = converse_on_stdio(&agent, &session_id).await;
        pool.close().await;
        turns
    });

    let source = if memory { "in-memory demo inventory" } else { "database inventory" };
    match result {
        Ok(turns) => CommandResult::success(
            "chat",
            format!("session {session_id} ended after {turns} turns ({source})"),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("chat", error_class, message, exit_code)
        }
    }
}

/// Demo inventory dated relative to `today`, held in memory only.
pub(crate) fn demo_store(today: NaiveDate) -> Result<InMemoryInventoryRepository, StepFailure> {
    let (items, batches) =
        DemoInventory::snapshot(today).map_err(|error| ("seed", error.to_string(), 6u8))?;
    Ok(InMemoryInventoryRepository::with_inventory(items, batches))
}

async fn converse_on_stdio<S: InventoryStore>(
    agent: &DefaultAgent<S>,
    session_id: &SessionId,
) -> Result<usize, StepFailure> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    converse(agent, session_id, stdin, &mut stdout)
        .await
        .map_err(|error| ("io", error.to_string(), 3u8))
}

/// Reads one utterance per line until EOF or an exit word; returns the number of turns handled.
pub(crate) async fn converse<S, R, W>(
    agent: &DefaultAgent<S>,
    session_id: &SessionId,
    reader: R,
    writer: &mut W,
) -> std::io::Result<usize>
where
    S: InventoryStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut turns = 0;

    writer.write_all(b"> ").await?;
    writer.flush().await?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if EXIT_WORDS.contains(&line.to_lowercase().as_str()) {
            break;
        }
        if !line.is_empty() {
            let reply = agent.process_utterance(session_id, line).await;
            writer.write_all(reply.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            turns += 1;
        }
        writer.write_all(b"> ").await?;
        writer.flush().await?;
    }
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(turns)
}
