use std::{
    env,
    fs::File,
    io::{BufRead, BufReader},
    process::ExitCode,
    time::Instant,
};

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paper_rank::{EngineConfig, RankRequest, RawDocument, Recommender, StaticSource};

const CLI_USER: &str = "cli";

struct Args {
    papers: String,
    query: Option<String>,
    config: Option<String>,
    since: DateTime<Utc>,
    interests: Vec<String>,
    likes: Vec<String>,
    window: String,
    sort: String,
    page: usize,
}

fn print_usage() {
    eprintln!("Usage: paper-rank --papers FILE [--query \"TEXT\"] [--config FILE] [--since RFC3339]");
    eprintln!("                  [--interests cs.CV,cs.LG] [--like ID]... [--window all|day|week|month|year]");
    eprintln!("                  [--sort relevance|popularity|date] [--page N]");
    eprintln!("FILE holds one JSON paper per line. Without --query the papers are ranked");
    eprintln!("against the profile built from --interests and --like.");
    eprintln!("Output format: <rank>\\t<score>\\t<id>\\t<title>");
}

fn parse_args() -> Result<Option<Args>, String> {
    let mut args = env::args().skip(1);
    let mut parsed = Args {
        papers: String::new(),
        query: None,
        config: None,
        since: DateTime::<Utc>::UNIX_EPOCH,
        interests: Vec::new(),
        likes: Vec::new(),
        window: "all".to_string(),
        sort: "relevance".to_string(),
        page: 1,
    };
    let value = |flag: &str, next: Option<String>| next.ok_or_else(|| format!("{flag} requires a value"));
    while let Some(a) = args.next() {
        match a.as_str() {
            "--papers" => parsed.papers = value("--papers", args.next())?,
            "--query" => parsed.query = Some(value("--query", args.next())?),
            "--config" => parsed.config = Some(value("--config", args.next())?),
            "--since" => {
                let v = value("--since", args.next())?;
                parsed.since = DateTime::parse_from_rfc3339(&v)
                    .map_err(|e| format!("--since: {e}"))?
                    .with_timezone(&Utc);
            }
            "--interests" => {
                let v = value("--interests", args.next())?;
                parsed.interests = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
            }
            "--like" => parsed.likes.push(value("--like", args.next())?),
            "--window" => parsed.window = value("--window", args.next())?,
            "--sort" => parsed.sort = value("--sort", args.next())?,
            "--page" => {
                let v = value("--page", args.next())?;
                parsed.page = v.parse().map_err(|_| format!("--page needs a number, got {v:?}"))?;
            }
            "-h" | "--help" => return Ok(None),
            other => {
                // first positional argument is the query
                if parsed.query.is_none() {
                    parsed.query = Some(other.to_string());
                } else {
                    warn!(arg = other, "extra argument ignored");
                }
            }
        }
    }
    if parsed.papers.is_empty() {
        return Err("--papers is required".to_string());
    }
    Ok(Some(parsed))
}

fn load_papers(path: &str) -> std::io::Result<Vec<RawDocument>> {
    let reader = BufReader::new(File::open(path)?);
    let mut documents = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RawDocument>(&line) {
            Ok(mut doc) => {
                // papers without full text are vectorized from their abstract
                if doc.text.trim().is_empty() {
                    doc.text = doc.meta.summary.clone();
                }
                documents.push(doc);
            }
            Err(e) => warn!(line = line_no + 1, error = %e, "skipping malformed paper"),
        }
    }
    Ok(documents)
}

fn run(args: Args) -> paper_rank::Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::from_env()?,
    };
    let request = RankRequest::parse(&args.window, &args.sort, args.page)?;

    let documents = load_papers(&args.papers).map_err(paper_rank::StoreError::Io)?;
    info!(papers = documents.len(), path = %args.papers, "loaded papers");

    let recommender = Recommender::in_memory(config);
    let start = Instant::now();
    let report = recommender.ingest(StaticSource::new(documents), args.since)?;
    info!(
        indexed = report.indexed,
        skipped = report.skipped,
        vocabulary = report.vocabulary,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "ingested"
    );

    let papers = recommender.papers();
    let page = match &args.query {
        Some(query) => recommender.rank_for_query(query, &papers, &request),
        None => {
            if !args.interests.is_empty() {
                recommender.bootstrap_interests(CLI_USER, &args.interests)?;
            }
            for paper_id in &args.likes {
                recommender.apply_feedback(CLI_USER, paper_id, true)?;
            }
            recommender.recommend(CLI_USER, &papers, &request)?
        }
    };

    if page.is_out_of_range() {
        warn!(page = page.info.page, total_pages = page.info.total_pages, "page out of range");
    }
    let offset = (page.info.page.max(1) - 1) * page.info.page_size;
    for (i, (paper, score)) in page.iter().enumerate() {
        println!("{}\t{}\t{}\t{}", offset + i + 1, score, paper.id, paper.meta.title.trim());
    }
    eprintln!(
        "[page {}/{}] sort={} neighbors={:?}",
        page.info.page, page.info.total_pages, page.sort_key, page.info.neighbors
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            error!("{e}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "paper-rank failed");
            ExitCode::FAILURE
        }
    }
}
