use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use metawin_analysis::{
    filter_by_time_frame, get_fear_and_greed_index, log, DataTable, QueryApiHttp, QueryVariant,
    SnapshotLoader, SnapshotStore, TimeFrame, DATE_COLUMN,
};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch or load today's snapshot for one dashboard tab.
    Refresh {
        /// Tab to refresh (txs-and-gas, tickets, users).
        #[clap(long)]
        variant: String,
    },
    /// Print a tab's headline metrics over a time window.
    Summary {
        /// Tab to summarize (txs-and-gas, tickets, users).
        #[clap(long)]
        variant: String,
        /// Time window (d7, d30, d90, d365, ytd, all).
        #[clap(long, default_value = "all")]
        time_frame: String,
    },
    /// Print the crypto fear & greed index for the last N days.
    FearGreed {
        #[clap(long, default_value_t = 30)]
        days: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Refresh { variant } => {
            let variant = variant.parse::<QueryVariant>()?;
            let table = load_snapshot(variant).await?;
            println!("{variant}: {} rows cached for today", table.len());
        }
        Commands::Summary {
            variant,
            time_frame,
        } => {
            let variant = variant.parse::<QueryVariant>()?;
            let time_frame = time_frame.parse::<TimeFrame>()?;
            let today = Utc::now().date_naive();

            let mut table = load_snapshot(variant).await?;
            table.sort_by_column(DATE_COLUMN)?;
            let filtered = filter_by_time_frame(&table, DATE_COLUMN, time_frame, today)?;

            print_summary(variant, time_frame, &filtered)?;
        }
        Commands::FearGreed { days } => {
            let points = get_fear_and_greed_index(days).await?;
            for point in points {
                println!(
                    "{}\t{}\t{}",
                    point.timestamp, point.value, point.value_classification
                );
            }
        }
    }

    Ok(())
}

async fn load_snapshot(variant: QueryVariant) -> anyhow::Result<DataTable> {
    let api = QueryApiHttp::new_from_env();
    let page_size = api.page_size();
    let loader = SnapshotLoader::new(api, SnapshotStore::new_from_env(), page_size);

    let today: NaiveDate = Utc::now().date_naive();
    Ok(loader.load(variant, today).await?)
}

fn print_summary(
    variant: QueryVariant,
    time_frame: TimeFrame,
    table: &DataTable,
) -> anyhow::Result<()> {
    println!("{variant} ({})", time_frame.label());

    match variant {
        QueryVariant::TxsAndGas => {
            println!(
                "total number of transactions: {}",
                table.column_sum("tot_txs_count")?
            );
            println!(
                "total eth gas fees generated: {}",
                table.column_sum("tot_eth_fee")?
            );
        }
        QueryVariant::Tickets => {
            println!(
                "total volume eth tickets sold: {}",
                table.column_sum("daily_eth_volume_tickets_sold")?
            );
            println!(
                "total volume usd tickets sold: {}",
                table.column_sum("daily_usd_volume_tickets_sold")?
            );
        }
        QueryVariant::Users => {
            println!(
                "average number of daily ticket buyers: {}",
                table.column_mean("num_active_users")?
            );
        }
    }

    Ok(())
}
