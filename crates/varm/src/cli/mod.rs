pub mod handlers;

use clap::{Arg, Command};

pub fn build_cli() -> Command {
    Command::new("varm")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Digital offer signing against a tabular record store")
        .subcommand_required(true)
        .subcommand(cmd_offer())
        .subcommand(Command::new("ping").about("Check that the CLI is alive"))
}

fn cmd_offer() -> Command {
    Command::new("offer")
        .about("Read and sign offers")
        .subcommand_required(true)
        .subcommand(
            Command::new("get")
                .about("Fetch an offer by slug")
                .arg(Arg::new("slug").required(true).help("Offer slug")),
        )
        .subcommand(
            Command::new("sign")
                .about("Sign an offer by slug (retries on write conflicts)")
                .arg(Arg::new("slug").required(true).help("Offer slug")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_offer_get() {
        let matches = build_cli()
            .try_get_matches_from(["varm", "offer", "get", "offer-42"])
            .expect("parses");
        let (name, sub) = matches.subcommand().expect("subcommand");
        assert_eq!(name, "offer");
        let (action, args) = sub.subcommand().expect("action");
        assert_eq!(action, "get");
        assert_eq!(
            args.get_one::<String>("slug").map(String::as_str),
            Some("offer-42")
        );
    }

    #[test]
    fn test_cli_parses_offer_sign() {
        let matches = build_cli()
            .try_get_matches_from(["varm", "offer", "sign", "offer-7"])
            .expect("parses");
        let (name, _) = matches.subcommand().expect("subcommand");
        assert_eq!(name, "offer");
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(build_cli().try_get_matches_from(["varm"]).is_err());
    }

    #[test]
    fn test_cli_requires_slug() {
        assert!(build_cli()
            .try_get_matches_from(["varm", "offer", "sign"])
            .is_err());
    }
}
