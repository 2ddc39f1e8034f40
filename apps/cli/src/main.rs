use std::{fmt::Display, path::PathBuf, process};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use tracing_subscriber::EnvFilter;
use ytts_core::{
    BatchRunner, CaptionClient, Config, DataApi, Highlight, KeywordSet, PlainText, SearchEngine,
    Selection, SortOrder, Sources, collect_candidates, parse_length_filters, parse_max_videos,
    search::DEFAULT_CONTEXT, select_by_length, youtube::http_client,
};

use crate::report::{ConsoleHighlight, ProgressReporter, print_rejected, print_summary};

mod report;

/// CLI wrapper for SortOrder (needed for clap ValueEnum)
#[derive(Clone, Copy, Default, ValueEnum)]
enum CliSort {
    #[default]
    Newest,
    Oldest,
    Popular,
}

impl From<CliSort> for SortOrder {
    fn from(cli: CliSort) -> Self {
        match cli {
            CliSort::Newest => SortOrder::Newest,
            CliSort::Oldest => SortOrder::Oldest,
            CliSort::Popular => SortOrder::Popular,
        }
    }
}

#[derive(Parser)]
#[command(name = "ytts", version)]
#[command(about = "Search YouTube video transcripts for keywords and jump to the exact moment")]
struct Cli {
    /// Keywords, comma separated. Quote a phrase to keep commas inside it.
    #[arg(short, long)]
    keyword: String,

    /// Channel ID, @handle or channel URL
    #[arg(short, long)]
    channel: Option<String>,

    /// Order of channel videos
    #[arg(short, long, value_enum, default_value = "newest")]
    sort: CliSort,

    /// Maximum videos per channel or playlist (e.g. 200, 1.3k, 2,000)
    #[arg(short, long, value_parser = parse_maximum)]
    maximum: Option<usize>,

    /// Single video URL or ID
    #[arg(short, long)]
    video: Option<String>,

    /// File with one video URL per line
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Playlist URL or ID
    #[arg(short, long)]
    playlist: Option<String>,

    /// Length filters like +5m or -2h, all must hold. Put this flag last or
    /// separate expressions with commas.
    #[arg(short = 'x', long, num_args = 1.., allow_hyphen_values = true)]
    length: Vec<String>,

    /// Transcript segments of context around each match
    #[arg(short = 'C', long, default_value_t = DEFAULT_CONTEXT)]
    context: usize,

    /// Preferred caption language (e.g. "en", "de")
    #[arg(long)]
    lang: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Debug logging on stderr
    #[arg(long)]
    verbose: bool,
}

fn parse_maximum(raw: &str) -> std::result::Result<usize, String> {
    parse_max_videos(raw).map_err(|e| e.to_string())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ytts=debug,ytts_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(err: impl Display) -> ! {
    eprintln!("{} {}", style("Error:").red().bold(), err);
    process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.no_color {
        console::set_colors_enabled(false);
    }

    // Validate configuration before touching the network
    let mut config = Config::from_env().unwrap_or_else(|e| fail(e));
    if let Some(lang) = &cli.lang {
        config = config.with_caption_lang(lang);
    }
    let filters = parse_length_filters(&cli.length).unwrap_or_else(|e| fail(e));
    let keywords = KeywordSet::parse(&cli.keyword);
    if keywords.is_empty() {
        fail("no keywords given");
    }

    let client = http_client(&config)?;
    let api = DataApi::new(client.clone(), &config);
    let captions = CaptionClient::new(client, config.caption_lang.clone());

    let sources = Sources {
        channel: cli.channel,
        sort: cli.sort.into(),
        playlist: cli.playlist,
        max_videos: cli.maximum,
        video: cli.video,
        url_file: cli.file,
    };
    let candidates = collect_candidates(&api, &sources).await;
    for rejected in &candidates.rejected {
        print_rejected(rejected);
    }

    let videos = match select_by_length(&api, candidates.videos, &filters).await {
        Selection::Ready(videos) => videos,
        Selection::NoVideos => {
            println!("No videos to process.");
            return Ok(());
        }
        Selection::NoneMatchLength => {
            println!("No videos match length filters.");
            return Ok(());
        }
    };

    let highlighter: &dyn Highlight = if cli.no_color {
        &PlainText
    } else {
        &ConsoleHighlight
    };
    let engine = SearchEngine::new(&keywords, highlighter).with_context(cli.context);
    let runner = BatchRunner::new(&captions, &api, engine);

    let mut progress = ProgressReporter::new(videos.len());
    let bar = progress.bar().clone();

    let result = tokio::select! {
        result = runner.run(&videos, &mut progress) => result,
        _ = tokio::signal::ctrl_c() => {
            bar.finish_and_clear();
            println!("\nstopping..");
            return Ok(());
        }
    };
    bar.finish_and_clear();

    print_summary(&result);
    Ok(())
}
