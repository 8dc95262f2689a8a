//! Batch Evaluation Harness
//!
//! Replays a fixed list of financial queries through the agent in stateless
//! mode (one fresh transcript per query) and records the answers in
//! `test_results.csv` for regression review.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use agent_core::{Agent, AgentConfig, ToolRegistry};
use agent_runtime::MistralProvider;
use finpal_advisor::{
    tools::{CurrencyConverterTool, SipCalculatorTool},
    FINPAL_SYSTEM_PROMPT,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const OUTPUT_FILE: &str = "test_results.csv";

const TEST_QUERIES: &[&str] = &[
    "I want to invest ₹5000 monthly in SIP for 15 years with 12% expected returns. What will be my corpus?",
    "What's the difference between a mutual fund and an ETF?",
    "Convert $100 to INR. Then, if I invest that amount monthly for 5 years with 8% expected returns, what will be my corpus?",
    "What is inflation and why is it important for my investments?",
    "How much will $1000 grow to in 10 years at an annual return of 7%?",
    "Calculate the SIP value if I put 2000 rupees every month for 10 years at 10.5% annual interest.",
    "How much should I save from my ₹8K/month student income in Bengaluru for essentials?",
    "If I invest 10000 INR per month at 15% for 20 years, what's the final amount?",
    "Should I buy Google stock today?",
    "How can I start building an emergency fund?",
    "Convert 50 GBP to USD and then tell me how much I'd have if I invested that amount for 3 years at 6% annually.",
    "What are the benefits of diversifying my investment portfolio?",
    "What is compounding?",
    "Can you explain what a bond is?",
    "I have 500 USD, convert it to EUR, then calculate its SIP value if I invest that EUR amount monthly for 7 years with 9% annual return.",
    "What is the SIP amount if I want to reach 1,00,000 in 5 years with 10% annual return?",
];

/// Quote a CSV field when it contains a delimiter, quote, or newline
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let provider = Arc::new(MistralProvider::from_env()?);

    let mut tools = ToolRegistry::new();
    tools.register(SipCalculatorTool)?;
    tools.register(CurrencyConverterTool)?;

    let agent = Agent::new(
        provider,
        Arc::new(tools),
        AgentConfig {
            system_prompt: FINPAL_SYSTEM_PROMPT.into(),
            ..AgentConfig::default()
        },
    );

    tracing::info!(
        "Starting FinPal evaluation: {} queries, results to {}",
        TEST_QUERIES.len(),
        OUTPUT_FILE
    );

    let mut writer = BufWriter::new(File::create(OUTPUT_FILE)?);
    writeln!(writer, "Query ID,User Query,FinPal Advisor Response")?;

    for (i, query) in TEST_QUERIES.iter().enumerate() {
        let query_id = i + 1;
        tracing::info!(query_id, "Running test query: {}", query);

        // Stateless mode: each query gets a fresh transcript
        let response = agent.ask(query).await;

        tracing::info!(query_id, "Response: {}", response);
        writeln!(
            writer,
            "{},{},{}",
            query_id,
            csv_field(query),
            csv_field(&response)
        )?;
    }

    writer.flush()?;
    tracing::info!("Evaluation complete. Results saved to {}", OUTPUT_FILE);

    Ok(())
}
