use std::path::PathBuf;

use clap::Parser;
use miette::Result;
use proofread_core::Config;
use proofread_review::pipeline::SpellCheckRun;

mod logging;

#[derive(Parser)]
#[command(
    name = "proofread",
    version,
    about = "Spelling and grammar review for pull requests",
    long_about = "Checks the files of a pull request for spelling and grammar issues with a\n\
                  language model and posts each finding as an inline review comment.\n\n\
                  Configuration comes from INPUT_* environment variables, as set by a\n\
                  GitHub Actions step:\n  \
                    INPUT_GITHUB_REPOSITORY, INPUT_GITHUB_TOKEN, INPUT_PR_NUMBER, INPUT_FILES,\n  \
                    INPUT_OPENAI_API_KEY, INPUT_OPENAI_MODEL, INPUT_MODEL_MAX_TOKEN (required)\n  \
                    INPUT_DEFAULT_LANGUAGE, INPUT_FAIL_ON_SPELLING, INPUT_FAIL_ON_GRAMMAR,\n  \
                    INPUT_FAIL_ON_BOTH, INPUT_LOG_LEVEL, INPUT_BOT_LOGIN,\n  \
                    INPUT_GITHUB_API_URL, INPUT_OPENAI_BASE_URL (optional)\n\n\
                  Exits with 1 when an issue matches an enabled INPUT_FAIL_ON_* category."
)]
struct Cli {
    /// Append each file's parsed issues to this JSON-lines file
    #[arg(long, env = "INPUT_RESULTS_FILE")]
    results_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _log = logging::init(config.log_level);
    tracing::debug!(?config, "configuration loaded");

    let results_file = cli
        .results_file
        .filter(|path| !path.as_os_str().is_empty());
    let run = SpellCheckRun::new(&config)?.with_results_file(results_file);
    let outcome = run.run().await;

    if outcome.is_failing() {
        tracing::error!(
            failing = outcome.failing_issues,
            "issues found in categories configured to fail"
        );
    }
    std::process::exit(outcome.exit_code());
}
