use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufReader};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use lotto_client::{
    CouponDeletion, Coupons, DrawLookup, HashtagDraws, HttpLottoApi, Terminal, config,
};

#[derive(Parser, Debug)]
#[command(
    name = "lotto-client",
    about = "Look up lotto draws and manage coupons on a lotto service",
    arg_required_else_help = true
)]
struct Cli {
    #[arg(long, help = "Service base URL (overrides LOTTO_BASE_URL)")]
    base_url: Option<String>,

    #[arg(long, help = "Request timeout in seconds (overrides LOTTO_TIMEOUT_SECS)")]
    timeout: Option<String>,

    #[arg(long, help = "Print results as HTML fragments")]
    html: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the winning numbers of a draw
    Draw { draw_no: String },
    /// Show the latest draw
    Latest,
    /// Show the number and date of the next draw
    Next,
    /// Compare six picked numbers with the latest draw
    Check {
        #[arg(required = true, num_args = 1..)]
        numbers: Vec<u8>,
    },
    /// List the draws tied to a YouTube hashtag
    Draws {
        hashtag: String,
        #[arg(long, help = "Redeem this coupon for the same hashtag")]
        coupon: Option<String>,
    },
    /// Delete a coupon (admin)
    DeleteCoupon {
        coupon_id: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// List issued coupons
    Coupons,
    /// Issue a new coupon (admin)
    CreateCoupon,
    /// Show coupons used with a hashtag
    CouponUses { hashtag: String },
    /// Submit a coupon with six picked numbers
    SubmitCoupon {
        coupon_code: String,
        hashtag: String,
        #[arg(required = true, num_args = 1..)]
        numbers: Vec<u8>,
    },
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// `RUST_LOG` directives on top of an `info` default.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(
            &std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default(),
        ))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let mut config = config::load().context("loading configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = config::parse_base_url(base_url)?;
    }
    if let Some(timeout) = &cli.timeout {
        config.timeout = config::parse_timeout(timeout)?;
    }

    let api = Arc::new(HttpLottoApi::new(&config)?);
    tracing::debug!(base_url = %api.base_url(), "client ready");

    let assume_yes = matches!(cli.command, Commands::DeleteCoupon { yes: true, .. });
    let mut terminal = Terminal::new(BufReader::new(io::stdin()), io::stdout()).html(cli.html);

    let failed = match cli.command {
        Commands::Draw { draw_no } => DrawLookup::new(api)
            .submit(&draw_no, &mut terminal)
            .await
            .is_failure(),
        Commands::Latest => DrawLookup::new(api).latest(&mut terminal).await.is_failure(),
        Commands::Next => {
            let today = chrono::Local::now().date_naive();
            DrawLookup::new(api)
                .upcoming(today, &mut terminal)
                .await
                .is_failure()
        }
        Commands::Check { numbers } => DrawLookup::new(api)
            .check(numbers, &mut terminal)
            .await
            .is_failure(),
        Commands::Draws { hashtag, coupon } => HashtagDraws::new(api)
            .fetch(&hashtag, coupon.as_deref(), &mut terminal)
            .await
            .is_failure(),
        Commands::DeleteCoupon { coupon_id, .. } => {
            admin_login(&api, &config).await?;
            let deletion = CouponDeletion::new(api.clone());
            let mut confirm =
                Terminal::new(BufReader::new(io::stdin()), io::stdout()).assume_yes(assume_yes);
            let outcome = deletion.run(&coupon_id, &mut confirm, &mut terminal).await;
            if terminal.take_reload() {
                Coupons::new(api).list(&mut terminal).await;
            }
            outcome.is_failure()
        }
        Commands::Coupons => Coupons::new(api).list(&mut terminal).await.is_failure(),
        Commands::CreateCoupon => {
            admin_login(&api, &config).await?;
            let coupons = Coupons::new(api);
            let outcome = coupons.create(&mut terminal).await;
            if terminal.take_reload() {
                coupons.list(&mut terminal).await;
            }
            outcome.is_failure()
        }
        Commands::CouponUses { hashtag } => Coupons::new(api)
            .uses(&hashtag, &mut terminal)
            .await
            .is_failure(),
        Commands::SubmitCoupon {
            coupon_code,
            hashtag,
            numbers,
        } => {
            Coupons::new(api)
                .submit(&coupon_code, &hashtag, numbers, &mut terminal)
                .await
                .is_failure()
        }
    };

    Ok(exit_code(failed))
}

async fn admin_login(api: &HttpLottoApi, config: &lotto_client::Config) -> Result<()> {
    match config.admin_credentials() {
        Some((username, password)) => api
            .login(username, password)
            .await
            .context("admin login failed"),
        None => {
            tracing::warn!("LOTTO_ADMIN_USERNAME/LOTTO_ADMIN_PASSWORD not set, continuing without a session");
            Ok(())
        }
    }
}
