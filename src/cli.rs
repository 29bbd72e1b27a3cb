use std::ffi::OsString;
use std::io::Write;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config;
use crate::core::fetcher::YtDlp;
use crate::core::pipeline::{self, Outcome};
use crate::reporter::Reporter;
use crate::sources::spotify::SpotifyClient;

#[derive(Parser, Debug)]
#[command(
    name = "spdl",
    about = "Download a Spotify track from YouTube as a tagged MP3",
    after_help = "Credentials come from SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET \
                  or the config file written by spdl-setup.",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Spotify track URL, e.g. https://open.spotify.com/track/<id>
    #[arg(
        value_name = "TRACK_URL",
        num_args = 0..,
        allow_hyphen_values = true,
        trailing_var_arg = true
    )]
    pub args: Vec<String>,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Track(String),
}

fn is_help_flag(arg: &str) -> bool {
    matches!(arg, "-h" | "--help")
}

/// Exactly one argument that is not a help flag is a track request;
/// anything else shows the usage text.
pub fn parse_invocation<I, T>(argv: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(e) => {
            tracing::debug!("unparseable arguments: {e}");
            return Invocation::Help;
        }
    };

    match cli.args.as_slice() {
        [arg] if !is_help_flag(arg) => Invocation::Track(arg.clone()),
        _ => Invocation::Help,
    }
}

pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

/// Logs go to stderr; stdout is reserved for the status report.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spdl=warn")))
        .init();
}

pub fn run<I, T, W>(argv: I, reporter: &mut Reporter<W>) -> Outcome
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    match parse_invocation(argv) {
        Invocation::Help => {
            reporter.usage(usage());
            Outcome::HelpShown
        }
        Invocation::Track(url) => {
            let cfg = config::load_config();
            let fetcher = YtDlp::new(&cfg.download.ytdlp);
            pipeline::run(&url, &cfg, SpotifyClient::new, &fetcher, reporter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(args: &[&str]) -> Invocation {
        parse_invocation(std::iter::once("spdl").chain(args.iter().copied()))
    }

    fn run_captured(args: &[&str]) -> (Outcome, String) {
        let mut reporter = Reporter::new(Vec::new(), false);
        let outcome = run(std::iter::once("spdl").chain(args.iter().copied()), &mut reporter);
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        (outcome, out)
    }

    #[test]
    fn test_single_url_is_track() {
        assert_eq!(
            parse(&["https://open.spotify.com/track/abc123"]),
            Invocation::Track("https://open.spotify.com/track/abc123".to_string())
        );
    }

    #[test]
    fn test_wrong_arity_is_help() {
        assert_eq!(parse(&[]), Invocation::Help);
        assert_eq!(parse(&["a", "b"]), Invocation::Help);
        assert_eq!(parse(&["a", "b", "c"]), Invocation::Help);
    }

    #[test]
    fn test_help_flags() {
        assert_eq!(parse(&["-h"]), Invocation::Help);
        assert_eq!(parse(&["--help"]), Invocation::Help);
        assert_eq!(
            parse(&["https://open.spotify.com/track/abc123", "--help"]),
            Invocation::Help
        );
    }

    #[test]
    fn test_single_non_url_is_still_track_request() {
        assert_eq!(
            parse(&["not-a-url"]),
            Invocation::Track("not-a-url".to_string())
        );
    }

    #[test]
    fn test_usage_mentions_argument() {
        let text = usage();
        assert!(text.contains("spdl"));
        assert!(text.contains("TRACK_URL"));
    }

    #[test]
    fn test_run_prints_usage_and_succeeds() {
        let usage = usage();
        let cases: [&[&str]; 4] = [&[], &["a", "b"], &["-h"], &["--help"]];
        for args in cases {
            let (outcome, out) = run_captured(args);
            assert_eq!(outcome, Outcome::HelpShown, "args: {:?}", args);
            assert_eq!(outcome.exit_code(), 0);
            assert_eq!(out.trim_end(), usage.trim_end());
        }
    }

    #[test]
    fn test_run_rejects_non_track_url() {
        let (outcome, out) = run_captured(&["https://open.spotify.com/album/abc123"]);
        assert_eq!(outcome, Outcome::InvalidInput);
        assert_eq!(outcome.exit_code(), 1);
        assert!(out.starts_with("❌ Invalid Input:"));
        assert!(!out.contains("TRACK_URL"));
    }

    proptest! {
        #[test]
        fn prop_wrong_arity_shows_usage(
            args in proptest::collection::vec("[A-Za-z0-9:/._?=]{1,24}", 0..6)
                .prop_filter("exactly one argument is a track request", |a| a.len() != 1),
        ) {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            let (outcome, out) = run_captured(&args);
            prop_assert_eq!(outcome, Outcome::HelpShown);
            let expected = usage();
            prop_assert_eq!(out.trim_end(), expected.trim_end());
        }

        #[test]
        fn prop_help_flag_anywhere_shows_usage(
            before in proptest::collection::vec("[a-z0-9]{1,8}", 0..3),
            flag in prop_oneof![Just("-h"), Just("--help")],
        ) {
            let mut args: Vec<&str> = before.iter().map(String::as_str).collect();
            args.push(flag);
            let (outcome, _) = run_captured(&args);
            prop_assert_eq!(outcome, Outcome::HelpShown);
        }
    }
}
