use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use vellum_sdk::{Content, Fields, Query, Ref, SdkError, Vellum, VellumConfig, WriteRequest};
use vellum_server::{ServerConfig, VellumServer};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let open = || -> anyhow::Result<Vellum> {
        let config = match &cli.config {
            Some(path) => VellumConfig::load(path)?,
            None => VellumConfig::with_data_dir(&cli.data_dir),
        };
        Vellum::open(&config)
            .with_context(|| format!("opening store at {}", config.store_path.display()))
    };
    let json = matches!(cli.format, OutputFormat::Json);

    match cli.command {
        Command::Write(args) => cmd_write(&open()?, args, json),
        Command::Read(args) => cmd_read(&open()?, args, json),
        Command::Raw(args) => cmd_raw(&open()?, args),
        Command::Blocks(args) => cmd_blocks(&open()?, args, json),
        Command::Search(args) => cmd_search(&open()?, args, json),
        Command::Verify(args) => cmd_verify(&open()?, args, json),
        Command::Serve(args) => cmd_serve(args, cli.data_dir.clone(), cli.config.clone()),
    }
}

fn cmd_write(vellum: &Vellum, args: WriteArgs, json: bool) -> anyhow::Result<()> {
    let reader: Box<dyn Read> = match &args.file {
        Some(path) if path.as_os_str() != "-" => Box::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        ),
        _ => Box::new(io::stdin().lock()),
    };

    let mut request =
        WriteRequest::new(&args.id, reader).with_fields(args.fields.into_iter().collect::<Fields>());
    if let Some(previous) = &args.previous {
        request = request.with_previous(previous.parse::<Ref>()?);
    }
    if args.ignore_duplicate {
        request = request.ignore_duplicate_blob();
    }

    let content = match vellum.write_request(request) {
        Ok(content) => content,
        Err(SdkError::IndexLag { content, source }) => {
            eprintln!(
                "{} stored but not indexed: {}",
                "warning:".yellow().bold(),
                source
            );
            *content
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&content)?);
    } else {
        println!("{} Wrote {}", "✓".green().bold(), content.id.bold());
        println!("  Content: {}", content.hash.to_string().yellow());
        println!("  Blob: {}", content.blob.to_string().dimmed());
        if let Some(previous) = content.previous_content {
            println!("  Replaces: {}", previous.to_string().dimmed());
        }
    }
    Ok(())
}

fn cmd_read(vellum: &Vellum, args: ReadArgs, json: bool) -> anyhow::Result<()> {
    let content = if args.hash {
        vellum.read_hash(&args.id.parse::<Ref>()?)?
    } else {
        vellum.read(&args.id)?
    };

    if !args.meta {
        let mut reader = vellum.open_payload(&content)?;
        io::copy(&mut reader, &mut io::stdout().lock())?;
        return Ok(());
    }

    let history = if args.history {
        vellum.history(&content)?
    } else {
        Vec::new()
    };
    if json {
        let value = json!({ "content": content, "history": history });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    print_content(&content);
    for older in &history {
        println!();
        print_content(older);
    }
    Ok(())
}

fn print_content(content: &Content) {
    let position = match content.index {
        0 => String::new(),
        1 => " (latest)".to_string(),
        n => format!(" ({} back)", n - 1),
    };
    println!("{} {}{}", content.id.bold(), content.hash.to_string().yellow(), position.dimmed());
    println!("  Blob: {}", content.blob);
    if let Some(previous) = content.previous_content {
        println!("  Previous: {}", previous.to_string().dimmed());
    }
    for (field, value) in content.fields.iter() {
        println!("  {}: {}", field.cyan(), value);
    }
}

fn cmd_raw(vellum: &Vellum, args: RawArgs) -> anyhow::Result<()> {
    let bytes = vellum.raw(&args.hash.parse::<Ref>()?)?;
    let mut out = io::stdout().lock();
    out.write_all(&bytes)?;
    out.flush()?;
    Ok(())
}

fn cmd_blocks(vellum: &Vellum, args: BlocksArgs, json: bool) -> anyhow::Result<()> {
    let blocks = vellum.blocks(args.limit)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
        return Ok(());
    }
    if blocks.is_empty() {
        println!("No blocks.");
    }
    for block in &blocks {
        println!(
            "{}  {}  content {}",
            format!("#{}", block.number).yellow().bold(),
            block.hash.short().dimmed(),
            block.content.short()
        );
    }
    Ok(())
}

fn cmd_search(vellum: &Vellum, args: SearchArgs, json: bool) -> anyhow::Result<()> {
    let mut query = Query::parse(&args.query.join(" "))?;
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }
    if let Some(skip) = args.skip {
        query = query.skip(skip);
    }

    let found = vellum.search(&query)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }
    if found.is_empty() {
        println!("No matches.");
    }
    for content in &found {
        println!("{}  {}", content.hash.short().yellow(), content.id);
    }
    Ok(())
}

fn cmd_verify(vellum: &Vellum, args: VerifyArgs, json: bool) -> anyhow::Result<()> {
    let report = vellum.verify(args.limit)?;
    let mut payload_failures = Vec::new();
    if args.payloads && report.is_valid() {
        for block in vellum.blocks(args.limit.unwrap_or(usize::MAX))? {
            let content = vellum.read_hash(&block.content)?;
            if let Err(e) = vellum.verify_payload(&content) {
                payload_failures.push((block.number, e.to_string()));
            }
        }
    }

    if json {
        let violations: Vec<_> = report
            .violations
            .iter()
            .map(|v| {
                json!({
                    "number": v.number,
                    "block": v.block,
                    "kind": format!("{:?}", v.kind),
                    "description": v.description,
                })
            })
            .collect();
        let value = json!({
            "head": report.head.number,
            "blocks": report.blocks,
            "valid": report.is_valid(),
            "violations": violations,
            "payloadFailures": payload_failures
                .iter()
                .map(|(number, error)| json!({ "number": number, "error": error }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if report.is_valid() {
        println!("{} Block chain integrity verified", "✓".green().bold());
        println!("  Head: #{}", report.head.number);
        println!("  Blocks checked: {}", report.blocks);
        if args.payloads && payload_failures.is_empty() {
            println!("  Payloads verified");
        }
        for (number, error) in &payload_failures {
            println!("{} #{} payload: {}", "✗".red().bold(), number, error);
        }
    } else {
        println!("{} Block chain integrity check failed", "✗".red().bold());
        for v in &report.violations {
            println!("  #{} {:?}: {}", v.number, v.kind, v.description);
        }
    }
    report.into_result()?;
    if !payload_failures.is_empty() {
        anyhow::bail!("{} payload(s) failed verification", payload_failures.len());
    }
    Ok(())
}

fn cmd_serve(
    args: ServeArgs,
    data_dir: PathBuf,
    vellum_config: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = match &args.server_config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading server config {}", path.display()))?,
        None => ServerConfig {
            data_dir,
            ..ServerConfig::default()
        },
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let server = match vellum_config {
        Some(path) => VellumServer::new(config, Vellum::open(&VellumConfig::load(path)?)?),
        None => VellumServer::open(config)?,
    };
    println!("Vellum server on {}", server.config().bind_addr.to_string().bold());
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}
