use currency_info_bot::agent::AgentRegistry;
use currency_info_bot::bot::handlers::{self, report_failure, Command};
use currency_info_bot::config::Settings;
use currency_info_bot::dispatcher::IntentDispatcher;
use currency_info_bot::intent::DialogflowClient;
use currency_info_bot::market::CoinMarketCapClient;
use currency_info_bot::service::CurrencyInfoService;
use currency_info_bot::tables::LookupTables;
use dotenvy::dotenv;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "currency_info_bot=info,hyper=warn,reqwest=warn,teloxide=info";

/// Regex patterns for redacting sensitive data
struct RedactionPatterns {
    telegram_url: Regex,
    telegram_token: Regex,
    telegram_bot: Regex,
    cmc_key: Regex,
    bearer: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            telegram_url: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
            telegram_token: Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
            telegram_bot: Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
            cmc_key: Regex::new(r#"(?i)(x-cmc_pro_api_key["':= ]+)[A-Za-z0-9-]+"#)?,
            bearer: Regex::new(r"(Bearer\s+)[A-Za-z0-9._~+/=-]+")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let mut output = input.to_string();
        output = self
            .telegram_url
            .replace_all(&output, "$1[TELEGRAM_TOKEN]$3")
            .to_string();
        output = self
            .telegram_token
            .replace_all(&output, "[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .telegram_bot
            .replace_all(&output, "$1[TELEGRAM_TOKEN]")
            .to_string();
        output = self.cmc_key.replace_all(&output, "${1}[MASKED]").to_string();
        output = self.bearer.replace_all(&output, "${1}[MASKED]").to_string();
        output
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // The caller's view of the buffer, not the redacted length
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), self.patterns.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Before logging, so nothing is written unredacted
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    init_logging(patterns);

    info!("Starting Currency Info bot...");

    let settings = init_settings();
    let tables = init_tables(&settings);

    let intents = Arc::new(DialogflowClient::new(&settings));
    let prices = Arc::new(CoinMarketCapClient::new(&settings));
    info!("Dialogflow and CoinMarketCap clients initialized.");

    let service = Arc::new(CurrencyInfoService::new(
        IntentDispatcher::new(tables),
        AgentRegistry::new(settings.agent_config(), intents),
        prices,
    ));

    let bot = Bot::new(settings.telegram_token.clone());
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {e}");
    }

    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![service])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn debug_mode() -> bool {
    std::env::var("DEBUG_MODE").is_ok_and(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter::new(io::stderr, patterns);
    let default_filter = if debug_mode() {
        "debug"
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Settings {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tables(settings: &Settings) -> Arc<LookupTables> {
    match LookupTables::load(&settings.currencies_path(), &settings.sort_fields_path()) {
        Ok(tables) => Arc::new(tables),
        Err(e) => {
            error!("Failed to load lookup tables: {}", e);
            std::process::exit(1);
        }
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handle_text))
        .branch(dptree::filter(|msg: Message| msg.voice().is_some()).endpoint(handle_voice))
        .branch(dptree::endpoint(handle_unsupported))
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> Result<(), teloxide::RequestError> {
    let chat_id = msg.chat.id;
    if let Err(e) = handlers::handle_command(bot.clone(), msg, cmd).await {
        report_failure(&bot, chat_id, "Command handler", &e).await;
    }
    respond(())
}

async fn handle_text(
    bot: Bot,
    msg: Message,
    service: Arc<CurrencyInfoService>,
) -> Result<(), teloxide::RequestError> {
    let chat_id = msg.chat.id;
    if let Err(e) = handlers::handle_text(bot.clone(), msg, service).await {
        report_failure(&bot, chat_id, "Text handler", &e).await;
    }
    respond(())
}

async fn handle_voice(bot: Bot, msg: Message) -> Result<(), teloxide::RequestError> {
    let chat_id = msg.chat.id;
    if let Err(e) = handlers::handle_voice(bot.clone(), msg).await {
        report_failure(&bot, chat_id, "Voice handler", &e).await;
    }
    respond(())
}

async fn handle_unsupported(bot: Bot, msg: Message) -> Result<(), teloxide::RequestError> {
    let chat_id = msg.chat.id;
    if let Err(e) = handlers::handle_unsupported(bot.clone(), msg).await {
        report_failure(&bot, chat_id, "Fallback handler", &e).await;
    }
    respond(())
}
