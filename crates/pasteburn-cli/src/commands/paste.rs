use std::io::{self, Read, Write};

use tracing::debug;

use pasteburn_core::{
    decode_verification_reference, DisclosedContent, IngestOutcome, OutputFormat, Status,
    Submission,
};

use crate::app::AppContext;
use crate::cli::{ConfirmArgs, GetArgs, PutArgs};
use crate::errors::CliError;
use crate::output::{disclosure_json, ingest_json};

use super::parse_paste_id;

fn read_content(file: Option<&str>) -> anyhow::Result<Vec<u8>> {
    match file {
        None | Some("-") => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
            Ok(buf)
        }
        Some(path) => std::fs::read(path).map_err(|e| {
            CliError::invalid_input(format!("Cannot read {}: {}", path, e)).into()
        }),
    }
}

pub fn handle_put(ctx: &AppContext, args: &PutArgs) -> anyhow::Result<()> {
    let content = read_content(args.file.as_deref())?;
    let engine = ctx.engine()?;

    let submission = Submission {
        password: args.password.clone().unwrap_or_default(),
        requested_expire_hours: args.expire_hours,
        content,
        client_ip: args.ip.clone(),
    };
    let result = engine.ingest(submission);
    debug!(status = %Status::of_ingest(&result), "Ingest finished");
    let outcome = result.map_err(CliError::from)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ingest_json(&outcome)?)?);
        return Ok(());
    }

    match outcome {
        IngestOutcome::Published { url } => println!("{}", url),
        IngestOutcome::VerificationRequired { redirect } => {
            println!("{}", redirect);
            if !ctx.quiet() {
                eprintln!("Paste is held until verified. To publish it, run:");
                eprintln!("  pasteburn confirm '{}'", redirect);
            }
        }
    }
    Ok(())
}

pub fn handle_get(ctx: &AppContext, args: &GetArgs) -> anyhow::Result<()> {
    let short_id = parse_paste_id(&args.id)?;
    let format = if args.raw {
        OutputFormat::Raw
    } else {
        OutputFormat::Rendered
    };

    let engine = ctx.engine()?;
    let passphrase = args.password.as_deref().unwrap_or_default();
    let disclosure = engine
        .disclose(&short_id, passphrase, format)
        .map_err(CliError::from)?;

    if args.json {
        let value = disclosure_json(&short_id, &disclosure);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    match &disclosure.content {
        DisclosedContent::Raw(bytes) => stdout.write_all(bytes)?,
        DisclosedContent::Rendered { text } => {
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    stdout.flush()?;
    Ok(())
}

pub fn handle_confirm(ctx: &AppContext, args: &ConfirmArgs) -> anyhow::Result<()> {
    let short_id = if args.id.contains("?id=") {
        decode_verification_reference(&args.id).map_err(CliError::from)?
    } else {
        parse_paste_id(&args.id)?
    };

    let engine = ctx.engine()?;
    engine.confirm(&short_id).map_err(CliError::from)?;

    let url = engine.public_url(&short_id);
    if ctx.quiet() {
        println!("{}", url);
    } else {
        println!("Paste is live at {}", url);
    }
    Ok(())
}
