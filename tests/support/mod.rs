//! SQLite fixture mirroring the ERP tables the feed reads.

#![allow(dead_code)]

use rusqlite::{Connection, params};
use salesfeed::config::DatabaseConfig;
use std::path::PathBuf;

const SCHEMA: &str = "
    CREATE TABLE PCPRACA (
        CODPRACA INTEGER PRIMARY KEY,
        PRACA TEXT NOT NULL
    );
    CREATE TABLE PCUSUARI (
        CODUSUR INTEGER PRIMARY KEY,
        NOME TEXT
    );
    CREATE TABLE PCPEDC (
        NUMPED INTEGER PRIMARY KEY,
        DATA TEXT NOT NULL,
        VLTOTAL REAL,
        VLBONIFIC REAL NOT NULL DEFAULT 0,
        CODUSUR INTEGER NOT NULL,
        CODFILIAL TEXT,
        CODPRACA INTEGER NOT NULL,
        CODCLI INTEGER
    );
    CREATE TABLE VW_SOMELIER (
        DESCRICAO TEXT NOT NULL,
        CODPROD INTEGER NOT NULL,
        DATA TEXT NOT NULL,
        QT REAL,
        PVENDA REAL,
        VLCUSTOFIN REAL
    );
    INSERT INTO PCPRACA (CODPRACA, PRACA) VALUES (1, 'CENTRO'), (2, 'ZONA NORTE');
    INSERT INTO PCUSUARI (CODUSUR, NOME) VALUES (10, 'MARIA SOUZA'), (11, 'JOAO LIMA');
";

/// A throwaway database file, removed on drop.
pub struct TestDb {
    pub path: PathBuf,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "salesfeed-{}-{}.db",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let conn = Connection::open(&path).expect("Failed to create test DB");
        conn.execute_batch(SCHEMA).expect("Failed to create schema");
        Self { path }
    }

    pub fn conn(&self) -> Connection {
        Connection::open(&self.path).expect("Failed to open test DB")
    }

    pub fn config(&self) -> DatabaseConfig {
        DatabaseConfig {
            path: self.path.to_string_lossy().into_owned(),
            busy_timeout_ms: 1000,
        }
    }

    pub fn add_sale(&self, description: &str, code: i64, date: &str, qt: f64, price: f64) {
        self.conn()
            .execute(
                "INSERT INTO VW_SOMELIER (DESCRICAO, CODPROD, DATA, QT, PVENDA, VLCUSTOFIN)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![description, code, date, qt, price, price * 0.6],
            )
            .expect("Failed to insert sale");
    }

    pub fn add_order(&self, numped: i64, date: &str, total: f64, bonus: f64) {
        self.add_order_for(numped, date, total, bonus, 10, 1);
    }

    pub fn add_order_for(
        &self,
        numped: i64,
        date: &str,
        total: f64,
        bonus: f64,
        codusur: i64,
        codpraca: i64,
    ) {
        self.conn()
            .execute(
                "INSERT INTO PCPEDC (NUMPED, DATA, VLTOTAL, VLBONIFIC, CODUSUR, CODFILIAL, CODPRACA, CODCLI)
                 VALUES (?1, ?2, ?3, ?4, ?5, '1', ?6, ?7)",
                params![numped, date, total, bonus, codusur, codpraca, 5000 + numped],
            )
            .expect("Failed to insert order");
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
