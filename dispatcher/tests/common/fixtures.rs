//! Test fixtures and data for dispatcher tests
//!
//! This module provides consistent configuration and tickets used across all
//! test suites.

use dispatcher::config::{API_TOKEN_VAR, BASE_URL_VAR};
use dispatcher::DispatchConfig;
use shared::Ticket;

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const BASE_URL: &'static str = "https://jira.test";
    pub const TOKEN: &'static str = "test-token";

    /// Candidate logins in configured (tie-break) order
    pub const PRINTER_CANDIDATES: [&'static str; 3] = ["alice", "bob", "carol"];
    pub const NETWORK_CANDIDATES: [&'static str; 2] = ["dave", "erin"];

    pub const LAPTOP_HANDOUT_SUBJECT: &'static str = "Выдача ноутбука - сотруднику Х";

    /// Routing configuration without base URL or token; both come from the environment
    pub const CONFIG: &'static str = r#"
        [backend]
        transition_id = "21"
        pending_query = "project = SD AND assignee is EMPTY"
        open_statuses = ["В работе", "Ожидается ответ пользователя"]

        [routing]
        ignored_prefixes = ["Выдача ноутбука -", "Изменение должности/оклада"]

        [routing.asset_tag]
        marker = "nb-z"
        allowed = ["nb-z04", "nb-z4-", "nb-24-"]

        [[routing.teams]]
        name = "printers"
        include = ["принтер", "картридж"]
        exclude = ["3d-принтер"]
        candidates = ["alice", "bob", "carol"]

        [[routing.teams]]
        name = "network"
        include = ["сеть", "vpn", "wi-fi"]
        candidates = ["dave", "erin"]

        [[routing.teams]]
        name = "workplace"
        include = ["ноутбук", "монитор"]
        candidates = ["frank"]

        [pacing]
        min_interval_ms = 0
    "#;

    /// Validated configuration pointing at [`Self::BASE_URL`]
    pub fn config() -> DispatchConfig {
        Self::config_for(Self::BASE_URL)
    }

    /// Validated configuration pointing at `base_url`
    pub fn config_for(base_url: &str) -> DispatchConfig {
        let mut config = DispatchConfig::from_toml_str(Self::CONFIG).unwrap();
        config.apply_env(|key| match key {
            k if k == BASE_URL_VAR => Some(base_url.to_string()),
            k if k == API_TOKEN_VAR => Some(Self::TOKEN.to_string()),
            _ => None,
        });
        config.validate().unwrap();
        config
    }

    pub fn printer_ticket(key: &str) -> Ticket {
        Ticket::new(key, "Не печатает принтер").with_description("В кабинете 301 принтер зажевал бумагу")
    }

    pub fn network_ticket(key: &str) -> Ticket {
        Ticket::new(key, "Не работает VPN").with_description("Сеть недоступна из дома")
    }

    pub fn laptop_handout_ticket(key: &str) -> Ticket {
        Ticket::new(key, Self::LAPTOP_HANDOUT_SUBJECT).with_description("Нужен ноутбук для нового сотрудника")
    }

    /// Matches no team at all
    pub fn unroutable_ticket(key: &str) -> Ticket {
        Ticket::new(key, "Вопрос").with_description("Подскажите номер телефона бухгалтерии")
    }

    /// Already assigned; the subject would otherwise be filtered out
    pub fn assigned_ticket(key: &str, assignee: &str) -> Ticket {
        Ticket::new(key, Self::LAPTOP_HANDOUT_SUBJECT).with_assignee(assignee)
    }

    /// Open-ticket counts for the printer candidates
    pub fn printer_loads(login: &str) -> u64 {
        match login {
            "alice" => 5,
            "bob" => 2,
            "carol" => 2,
            _ => 0,
        }
    }
}
