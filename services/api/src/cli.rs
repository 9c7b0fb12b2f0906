use crate::demo::{run_demo, run_fee_quote, DemoArgs, FeeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use delegate_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Delegate Intake",
    about = "Run the delegate registration service or exercise the pipeline from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the registration fee for a set of discount tags
    Fee(FeeArgs),
    /// Walk one registration through the wizard against in-memory gateways
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Fee(args) => run_fee_quote(args),
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delegate_intake::workflows::registration::AttachmentKind;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["delegate-intake-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn fee_accepts_repeated_tags() {
        let cli = Cli::try_parse_from(["delegate-intake-api", "fee", "--tag", "IELTS", "--tag", "SAT"])
            .expect("parses");
        match cli.command {
            Some(Command::Fee(args)) => assert_eq!(args.tags, vec!["IELTS", "SAT"]),
            other => panic!("expected fee command, got {other:?}"),
        }
    }

    #[test]
    fn demo_parses_failing_attachment() {
        let cli = Cli::try_parse_from(["delegate-intake-api", "demo", "--fail-upload", "ielts"])
            .expect("parses");
        match cli.command {
            Some(Command::Demo(args)) => {
                assert_eq!(args.fail_upload, Some(AttachmentKind::IeltsProof))
            }
            other => panic!("expected demo command, got {other:?}"),
        }

        assert!(
            Cli::try_parse_from(["delegate-intake-api", "demo", "--fail-upload", "cv"]).is_err()
        );
    }
}
