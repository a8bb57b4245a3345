// src/config.rs

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::Stores,
    services::{
        calculator::{AmountPolicy, VatRate},
        AuthService, Calculator, CustomerService, DashboardService, DocumentService,
        ExpenseService, InvoiceService, ProfileService,
    },
};

/// Settings read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub vat_rate: VatRate,
    pub amount_policy: AmountPolicy,
    pub fonts_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("DB_MAX_CONNECTIONS is not a number: '{raw}'"))?,
            None => 5,
        };

        let vat_rate = match lookup("VAT_RATE") {
            Some(raw) => {
                let rate = Decimal::from_str(raw.trim())
                    .with_context(|| format!("VAT_RATE is not a decimal: '{raw}'"))?;
                VatRate::new(rate).map_err(|e| anyhow!("VAT_RATE: {e}"))?
            }
            None => VatRate::default(),
        };

        let amount_policy = match lookup("AMOUNT_POLICY") {
            Some(raw) => raw.parse::<AmountPolicy>().map_err(|e| anyhow!("AMOUNT_POLICY: {e}"))?,
            None => AmountPolicy::default(),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections,
            vat_rate,
            amount_policy,
            fonts_dir: lookup("FONTS_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./fonts")),
        })
    }

    pub fn calculator(&self) -> Calculator {
        Calculator::new(self.vat_rate, self.amount_policy)
    }
}

pub async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await?;

    tracing::info!("Database connection established");
    Ok(pool)
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub customer_service: CustomerService,
    pub invoice_service: InvoiceService,
    pub expense_service: ExpenseService,
    pub profile_service: ProfileService,
    pub dashboard_service: DashboardService,
    pub document_service: DocumentService,
}

impl AppState {
    /// Wires every service to its collaborators.
    pub fn new(stores: Stores, config: &Config) -> Self {
        let calculator = config.calculator();

        let auth_service = AuthService::new(stores.users.clone(), config.jwt_secret.clone());
        let customer_service = CustomerService::new(stores.customers.clone(), stores.invoices.clone());
        let invoice_service =
            InvoiceService::new(stores.invoices.clone(), stores.customers.clone(), calculator);
        let expense_service = ExpenseService::new(stores.expenses.clone(), calculator);
        let profile_service = ProfileService::new(stores.profiles.clone());
        let dashboard_service =
            DashboardService::new(stores.invoices.clone(), stores.expenses.clone(), stores.customers.clone());
        let document_service = DocumentService::new(
            invoice_service.clone(),
            profile_service.clone(),
            config.fonts_dir.clone(),
        );

        Self {
            auth_service,
            customer_service,
            invoice_service,
            expense_service,
            profile_service,
            dashboard_service,
            document_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 2] = [("DATABASE_URL", "postgres://localhost/vatdesk"), ("JWT_SECRET", "s3cret")];

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&BASE)).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.vat_rate, VatRate::default());
        assert_eq!(config.amount_policy, AmountPolicy::Coerce);
        assert_eq!(config.fonts_dir, PathBuf::from("./fonts"));
    }

    #[test]
    fn overrides() {
        let mut pairs = BASE.to_vec();
        pairs.extend([("VAT_RATE", "0.05"), ("AMOUNT_POLICY", "reject"), ("DB_MAX_CONNECTIONS", "12")]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.vat_rate.value(), Decimal::new(5, 2));
        assert_eq!(config.amount_policy, AmountPolicy::Reject);
        assert_eq!(config.db_max_connections, 12);
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(Config::from_lookup(lookup(&[("JWT_SECRET", "x")])).is_err());

        for bad in [("VAT_RATE", "7.5"), ("VAT_RATE", "abc"), ("AMOUNT_POLICY", "lenient"), ("DB_MAX_CONNECTIONS", "-1")] {
            let mut pairs = BASE.to_vec();
            pairs.push(bad);
            assert!(Config::from_lookup(lookup(&pairs)).is_err(), "{bad:?} should be rejected");
        }
    }

    #[tokio::test]
    async fn state_wires_services_to_stores() {
        let config = Config::from_lookup(lookup(&BASE)).unwrap();
        let state = AppState::new(Stores::memory(), &config);

        let token = state.auth_service.register_user("owner@shop.ng", "long password").await.unwrap();
        let me = state.auth_service.current_user(&token).await.unwrap();
        assert!(state.customer_service.list(me.id).await.unwrap().is_empty());
    }
}
