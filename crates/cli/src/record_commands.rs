use {
    anyhow::{Result, bail},
    clap::Subcommand,
    tooby_config::ToobyConfig,
    tooby_store::{RecordStore, SqliteStore},
};

#[derive(Subcommand)]
pub enum RecordAction {
    /// Print one value (drawn at random when several are stored).
    Get { kind: String, name: String },
    /// Print every value stored under a name.
    Show { kind: String, name: String },
    /// Replace every value stored under a name.
    Set {
        kind: String,
        name: String,
        #[arg(required = true, num_args = 1..)]
        value: Vec<String>,
    },
    /// Store another value under a name, keeping existing ones.
    Add {
        kind: String,
        name: String,
        #[arg(required = true, num_args = 1..)]
        value: Vec<String>,
    },
    /// Remove every value stored under a name.
    Delete { kind: String, name: String },
    /// List the names stored for a kind.
    List { kind: String },
    /// Store a connection setting, e.g. `twitch botnick toobybot`.
    Setting {
        platform: String,
        field: String,
        value: String,
    },
}

pub async fn handle_record(action: RecordAction, config: &ToobyConfig) -> Result<()> {
    let store = SqliteStore::connect(&config.store.database_url).await?;
    for line in execute(action, &store).await? {
        println!("{line}");
    }
    Ok(())
}

/// Apply `action` and return the lines to print.
async fn execute(action: RecordAction, store: &dyn RecordStore) -> Result<Vec<String>> {
    Ok(match action {
        RecordAction::Get { kind, name } => {
            vec![store.get(store.record_kind(&kind)?, &name).await?]
        },
        RecordAction::Show { kind, name } => {
            let kind = store.record_kind(&kind)?;
            let records = store.get_all(kind, &name).await?;
            if records.is_empty() {
                bail!("{kind} {name} not found");
            }
            records
                .into_iter()
                .map(|r| match r.added_by {
                    Some(by) => format!("{} (added by {by})", r.value),
                    None => r.value,
                })
                .collect()
        },
        RecordAction::Set { kind, name, value } => {
            let kind = store.record_kind(&kind)?;
            store.set(kind, &name, &value.join(" "), None).await?;
            vec![format!("{kind} {name} successfully set.")]
        },
        RecordAction::Add { kind, name, value } => {
            let kind = store.record_kind(&kind)?;
            store.add(kind, &name, &value.join(" "), None).await?;
            vec![format!("{kind} {name} successfully added.")]
        },
        RecordAction::Delete { kind, name } => {
            let kind = store.record_kind(&kind)?;
            match store.delete(kind, &name).await? {
                0 => bail!("{kind} {name} not found"),
                n => vec![format!("{kind} {name} deleted ({n} records).")],
            }
        },
        RecordAction::List { kind } => store.names(store.record_kind(&kind)?).await?,
        RecordAction::Setting {
            platform,
            field,
            value,
        } => {
            store.set_connection_setting(&platform, &field, &value).await?;
            vec![format!("{platform} {field} saved.")]
        },
    })
}
