//! Static bot copy: poll catalog, welcome texts and reply templates.

use indoc::indoc;

/// One poll question with its answer options, in display order.
#[derive(Debug, Clone, Copy)]
pub struct PollQuestion {
    pub question: &'static str,
    pub options: &'static [&'static str],
}

pub const POLL_QUESTIONS: &[PollQuestion] = &[
    PollQuestion {
        question: "How do you usually approach airdrop farming?",
        options: &[
            "I follow public guides",
            "I come up with my own strategy",
            "A mix of both",
            "I don't farm yet, just exploring",
        ],
    },
    PollQuestion {
        question: "How many wallets do you actively use for farming or DeFi tasks?",
        options: &["Just 1", "2-5", "5-10", "10-100", "100+"],
    },
];

/// Caption of the welcome animation (plain text, fits the 1024 char caption limit).
pub const WELCOME_CAPTION: &str = indoc! {"
    Welcome to Routie — your Web3 growth assistant!

    1. How it works
    Connect wallet → Choose project → Enter deposit → Launch route → Track progress or relax — it's all automated.

    2. How your data is protected
    We use Privy, trusted by OpenSea, Farcaster & more. Your data stays encrypted — we never see or store it.

    3. How to get a better price on Routie
    Become an early bird — it’s 70% off during development. Like buying an apartment at the foundation stage — smart."};

/// Long welcome sent as an HTML message when no animation is configured.
pub const START_MESSAGE: &str = indoc! {"
    Welcome to Routie — your Web3 growth assistant!

    No more manual farming. It keeps your time safe & sound.

    1. <b>How it works</b>
    Connect wallet → Choose project → Enter deposit → Launch farming route → Track progress or relax — it's all automated.

    2. <b>How your data is protected</b>
    We use Privy, trusted by OpenSea, Farcaster & more. Your data stays encrypted — we never see or store it.

    3. <b>How to become Paver Durov 🥷</b>

    We don't know. But how to become one of 500 Routie's supporters? By getting early access for sybmolic $2: skip the damn surveys and help us building &lt;3

    You'll get:

    - 70% off your first route
    - a seat at the table: help shape Routie’s future
    – unlocking early features
    - maybe even a sticker pack

    🐣 We need believers. We need you. And if you ever needed an excuse to skip a few grindy nights — maybe you need Routie."};

pub const APPLY_FOR_BETA_BUTTON: &str = "Apply for beta";
pub const GET_EARLY_ACCESS_BUTTON: &str = "Get early access";
pub const CONTACT_TEAM_BUTTON: &str = "Contact the team";

pub const PRIVATE_CHAT_ONLY: &str = "Please start the bot in a private chat";
pub const SERVICE_UNAVAILABLE: &str = "Service is temporarily unavailable, please try again later";
pub const GENERIC_ERROR: &str = "Error :(";

pub const POLL_INTRO: &str = "Answer 2 quick questions to apply for beta and get a first farming route for free:";
pub const POLL_ALREADY_COMPLETED: &str = "You have already answered all questions! Thanks for participating.";
pub const POLL_INVALID_DATA: &str = "Invalid poll data";
pub const POLL_ALREADY_ANSWERED: &str = "This question is already answered";
pub const POLL_COMPLETED: &str = indoc! {"
    Congrats! You'll be one of the first to try true farming automation in action.

    The first project to automize — Abstract

    We'll ping you when it's live 🌀"};

pub const INVOICE_TITLE: &str = "Routie early bird";
pub const INVOICE_DESCRIPTION: &str =
    "Early access to Routie: 70% off your first route, early features and a seat at the table.";
pub const INVOICE_LABEL: &str = "Early bird access";

pub const USER_NOT_FOUND: &str = "Please press /start first";
pub const ALREADY_HAS_ACCESS: &str = "You already have early access";
pub const SALES_DISABLED: &str = "Early access is not available right now";
pub const SEATS_SOLD_OUT: &str = "All early bird seats are taken";
pub const SEATS_SOLD_OUT_REFUNDED: &str =
    "Sorry, the last early bird seat was taken while you were paying. Your Stars have been refunded.";
pub const UNKNOWN_PAYMENT_ACTION: &str = "Unknown payment";
pub const FOREIGN_INVOICE: &str = "This invoice belongs to another user";

pub const NOT_AN_ADMIN: &str = "You are not an admin";

pub fn early_bird_badge(rank: u64) -> String {
    format!("🐣 Early bird #{}", rank)
}

pub fn early_bird_congrats(rank: u64) -> String {
    format!(
        "You're in! You are early bird #{} 🐣\n\nThanks for believing in Routie. We'll reach out with early features and your 70% discount as soon as they're live.",
        rank
    )
}
