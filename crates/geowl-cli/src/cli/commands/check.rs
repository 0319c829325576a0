//! `geowl check` - Decide for addresses given on the command line.

use anyhow::Result;
use colored::Colorize;
use futures_util::future::join_all;
use geowl::Verdict;

use super::Context;
use crate::cli::args::{CheckArgs, OutputFormat};

pub async fn execute(ctx: Context, args: CheckArgs) -> Result<()> {
    let engine = ctx.engine_config()?;
    let gate = ctx.gatekeeper(&engine).await?;

    let verdicts = join_all(args.addresses.iter().map(|addr| gate.evaluate(addr))).await;

    for (addr, verdict) in args.addresses.iter().zip(verdicts) {
        println!("{}", render(addr, verdict, args.output, args.no_color));
    }

    Ok(())
}

/// Format one verdict line.
pub fn render(addr: &str, verdict: Verdict, format: OutputFormat, no_color: bool) -> String {
    match format {
        OutputFormat::Json => serde_json::json!({
            "address": addr,
            "allowed": verdict.allowed,
            "reason": verdict.reason.to_string(),
        })
        .to_string(),
        OutputFormat::Pretty => {
            let word = if verdict.allowed { "ALLOW" } else { "DENY" };
            if no_color {
                format!("{addr}\t{word}\t{}", verdict.reason)
            } else {
                let word = if verdict.allowed {
                    word.green().bold()
                } else {
                    word.red().bold()
                };
                format!("{}\t{word}\t{}", addr.cyan(), verdict.reason.to_string().dimmed())
            }
        }
    }
}
