use clap::Parser;
use qledger_store::adapters::export;
use qledger_store::utils::logger;
use qledger_store::{
    CliConfig, Command, LedgerError, QLedgerTransactionRepository, Transaction,
    TransactionRepository,
};
use std::fs::File;
use std::io::BufWriter;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI args: {:?}", cli);

    if let Err(e) = run(&cli).await {
        tracing::error!("❌ {}", e);
        eprintln!("❌ {}", e);

        let exit_code = if e.is_config() { 2 } else { 1 };
        std::process::exit(exit_code);
    }
}

async fn run(cli: &CliConfig) -> Result<(), LedgerError> {
    let config = cli.ledger_config()?;
    let repository = QLedgerTransactionRepository::from_config(&config)?;

    match &cli.command {
        Command::Ping => {
            repository.ping().await?;
            println!("✅ Ledger at {} is reachable", config.endpoint);
        }
        Command::Create { account, file } => {
            let content = std::fs::read_to_string(file)?;
            let tx: Transaction = serde_json::from_str(&content)?;
            if tx.balance() != 0 {
                tracing::warn!(
                    "Transaction {} does not balance ({}), the ledger may reject it",
                    tx.id,
                    tx.balance()
                );
            }

            repository.create_transaction(account, &tx).await?;
            println!("✅ Created transaction {}", tx.id);
        }
        Command::List {
            account,
            format,
            output,
        } => {
            let transactions = repository.get_account_transactions(account).await?;
            tracing::info!(
                "📒 {} transactions for account {}",
                transactions.len(),
                account
            );

            match output {
                Some(path) => {
                    let writer = BufWriter::new(File::create(path)?);
                    export::write_transactions(writer, &transactions, *format)?;
                    println!("📁 Output saved to: {}", path.display());
                }
                None => {
                    let stdout = std::io::stdout();
                    export::write_transactions(stdout.lock(), &transactions, *format)?;
                }
            }
        }
    }

    Ok(())
}
