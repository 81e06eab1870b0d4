//! Fixed user-facing texts
//!
//! Commands and unsupported message kinds never reach the intent service;
//! they are answered with these texts.

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Reply to `/start`
pub const START_MESSAGE: &str = "👋 <b>Hi! I am the Currency Info bot.</b>\n\n\
     Ask me about cryptocurrencies in plain words, for example:\n\
     • <i>How much is bitcoin in euro?</i>\n\
     • <i>Show me top 5 coins by market cap</i>\n\n\
     Send /help to see what else I can do.";

/// Reply to `/stop`
pub const STOP_MESSAGE: &str =
    "Bye! I won't bother you. Just write me again whenever you need a quote.";

/// Reply to `/help`
pub const HELP_MESSAGE: &str = "<b>What I understand:</b>\n\n\
     • <b>Prices</b>: <i>btc and eth price in usd</i>\n\
     • <b>Top lists</b>: <i>top 10 by volume</i>, <i>3 newest coins</i>\n\n\
     Top lists can be ranked by price, market cap, volume, price change, \
     supply, number of market pairs or listing date.\n\n\
     /start - greeting\n\
     /help - this message\n\
     /stop - say goodbye";

// ─────────────────────────────────────────────────────────────────────────────
// Unsupported input
// ─────────────────────────────────────────────────────────────────────────────

/// Reply to voice messages
pub const VOICE_UNSUPPORTED: &str = "Sorry...\nVoice messages currently is not supported =(";

/// Reply to stickers, photos, documents and anything else without text
pub const UNSUPPORTED_MESSAGE: &str =
    "Sorry, I only understand text. Ask me about a coin price or a top list.";
