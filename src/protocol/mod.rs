use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::error::CoreError;
use crate::model::pair::{Direction, WordPair};
use crate::services::debounce::{Debouncer, SEARCH_DELAY};
use crate::services::dictionary::index::PrefixIndex;
use crate::services::dictionary::matcher::{self, LookupResult, SUGGESTION_LIMIT};
use crate::services::dictionary::store::{self, DictionaryTable};
use crate::services::{qa, source};

mod command;
use command::Command;

const ENML_TABLE: &str = "English-Malayalam";
const MLML_TABLE: &str = "Malayalam-Malayalam";

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload<'a>(req: &'a Value) -> &'a Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn parse_direction(payload: &Value) -> Result<Direction, String> {
    let s = payload
        .get("direction")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    Direction::parse(s)
        .ok_or_else(|| "payload.direction must be one of en-ml, ml-en, ml-ml".to_string())
}

/// A keystroke waiting out the debounce delay.
#[derive(Debug, Clone)]
struct PendingSearch {
    query: String,
    direction: Direction,
}

/// Owner of all mutable state: the two tables, the three prefix indexes
/// (one per searchable side), and the debounce slot. The lookup itself
/// stays a pure function in the matcher.
#[derive(Debug)]
pub struct Session {
    config: AppConfig,
    enml: DictionaryTable,
    mlml: DictionaryTable,
    enml_from: PrefixIndex,
    enml_to: PrefixIndex,
    mlml_from: PrefixIndex,
    pending: Debouncer<PendingSearch>,
}

impl Session {
    /// Loads both tables and builds the indexes. Any error here is fatal:
    /// the process must not serve queries over a partial dictionary.
    pub fn bootstrap(config: AppConfig) -> Result<Session, CoreError> {
        let cache_dir = config.cache_dir();

        let enml = source::load_table(ENML_TABLE, &config.enml_source(), &cache_dir)?;
        let mlml = source::load_table(MLML_TABLE, &config.mlml_source(), &cache_dir)?;

        let mut session = Session {
            config,
            enml,
            mlml,
            enml_from: PrefixIndex::new(),
            enml_to: PrefixIndex::new(),
            mlml_from: PrefixIndex::new(),
            pending: Debouncer::new(SEARCH_DELAY),
        };

        session.rebuild_indexes();

        eprintln!(
            "[core] loaded {} EN-ML and {} ML-ML pairs",
            session.enml.len(),
            session.mlml.len()
        );

        Ok(session)
    }

    fn rebuild_indexes(&mut self) {
        self.enml_from.clear();
        self.enml_to.clear();
        self.mlml_from.clear();

        for (row, pair) in self.enml.pairs().iter().enumerate() {
            self.enml_from.insert(&pair.from_text, row as u32);
            self.enml_to.insert(&pair.to_text, row as u32);
        }

        for (row, pair) in self.mlml.pairs().iter().enumerate() {
            self.mlml_from.insert(&pair.from_text, row as u32);
        }
    }

    fn run_lookup(&self, direction: Direction, query: &str) -> LookupResult {
        let (table, index) = match direction {
            Direction::EnMl => (&self.enml, &self.enml_from),
            Direction::MlEn => (&self.enml, &self.enml_to),
            Direction::MlMl => (&self.mlml, &self.mlml_from),
        };

        matcher::lookup(
            table.pairs(),
            index,
            direction.swapped(),
            query,
            SUGGESTION_LIMIT,
        )
    }

    /// Validates, appends to the governing table, updates its indexes in the
    /// same step, then persists the whole table. A failed write-back is
    /// returned as a warning; the in-memory entry stays either way.
    fn add_word(
        &mut self,
        direction: Direction,
        from: &str,
        to: &str,
    ) -> Result<(WordPair, Option<String>), CoreError> {
        let pair = store::validate_pair(from, to)?;

        // ml-en submissions arrive (Malayalam, English); store them in
        // schema order so from_content stays the English column.
        let pair = if direction.swapped() {
            WordPair {
                from_text: pair.to_text,
                to_text: pair.from_text,
            }
        } else {
            pair
        };

        let cache_dir = self.config.cache_dir();

        let save_result = match direction {
            Direction::EnMl | Direction::MlEn => {
                let row = self.enml.push(pair.clone());
                self.enml_from.insert(&pair.from_text, row);
                self.enml_to.insert(&pair.to_text, row);

                let path = source::persist_path(&self.config.enml_source(), &cache_dir);
                store::save(&self.enml, &path)
            }
            Direction::MlMl => {
                let row = self.mlml.push(pair.clone());
                self.mlml_from.insert(&pair.from_text, row);

                let path = source::persist_path(&self.config.mlml_source(), &cache_dir);
                store::save(&self.mlml, &path)
            }
        };

        let warning = save_result.err().map(|e| {
            let msg = e.to_string();
            eprintln!("[dict] write-back failed, keeping in-memory entry: {msg}");
            msg
        });

        Ok((pair, warning))
    }

    /// Re-reads both tables from their sources and rebuilds the indexes.
    /// On failure the previous in-memory state is kept untouched.
    fn reload(&mut self) -> Result<(), CoreError> {
        let cache_dir = self.config.cache_dir();

        let enml = source::load_table(ENML_TABLE, &self.config.enml_source(), &cache_dir)?;
        let mlml = source::load_table(MLML_TABLE, &self.config.mlml_source(), &cache_dir)?;

        self.enml = enml;
        self.mlml = mlml;
        self.rebuild_indexes();
        self.pending.clear();

        Ok(())
    }

    pub fn handle(&mut self, input: &str) -> String {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                return json!({
                    "status": "error",
                    "message": "invalid json"
                })
                .to_string();
            }
        };

        let id = get_id(&req);
        let cmd_str = get_cmd(&req);
        let payload = get_payload(&req);

        match Command::from(cmd_str) {
            Command::Ping => ok(id, json!({ "message": "nighantu-core alive" })),

            Command::Search => {
                let direction = match parse_direction(payload) {
                    Ok(d) => d,
                    Err(e) => return err(id, e),
                };
                let query = payload.get("query").and_then(|v| v.as_str()).unwrap_or("");

                let result = self.run_lookup(direction, query);
                ok(id, serde_json::to_value(result).unwrap_or(json!({})))
            }

            Command::SearchInput => {
                let direction = match parse_direction(payload) {
                    Ok(d) => d,
                    Err(e) => return err(id, e),
                };
                let query = payload
                    .get("query")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();

                self.pending.submit(PendingSearch { query, direction });

                ok(
                    id,
                    json!({
                        "pending": true,
                        "delay_ms": SEARCH_DELAY.as_millis() as u64
                    }),
                )
            }

            Command::SearchPoll => match self.pending.poll() {
                Some(p) => {
                    let result = self.run_lookup(p.direction, &p.query);
                    ok(
                        id,
                        json!({
                            "fired": true,
                            "query": p.query,
                            "direction": p.direction.as_str(),
                            "result": serde_json::to_value(result).unwrap_or(json!({}))
                        }),
                    )
                }
                None => ok(
                    id,
                    json!({
                        "fired": false,
                        "pending": self.pending.is_pending()
                    }),
                ),
            },

            Command::DictAdd => {
                let direction = match parse_direction(payload) {
                    Ok(d) => d,
                    Err(e) => return err(id, e),
                };
                let from = payload.get("from").and_then(|v| v.as_str()).unwrap_or("");
                let to = payload.get("to").and_then(|v| v.as_str()).unwrap_or("");

                match self.add_word(direction, from, to) {
                    Ok((pair, warning)) => ok(
                        id,
                        json!({
                            "pair": serde_json::to_value(&pair).unwrap_or(json!({})),
                            "persisted": warning.is_none(),
                            "warning": warning
                        }),
                    ),
                    Err(e) => err(id, e.to_string()),
                }
            }

            Command::DictReload => match self.reload() {
                Ok(()) => ok(
                    id,
                    json!({
                        "enml_rows": self.enml.len(),
                        "mlml_rows": self.mlml.len()
                    }),
                ),
                Err(e) => err(id, e.to_string()),
            },

            Command::DictCheck => {
                let mut issues = qa::run(&self.enml);
                issues.extend(qa::run(&self.mlml));

                ok(
                    id,
                    json!({ "issues": serde_json::to_value(issues).unwrap_or(json!([])) }),
                )
            }

            Command::Unknown => err(id, "unknown command"),
        }
    }
}
