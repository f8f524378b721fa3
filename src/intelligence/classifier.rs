/// Token and pool classification with static metadata tables
///
/// Pool ids resolve to their two token symbols, symbols resolve to a category,
/// decimals and a conversion rate into the common unit of account. Rates are
/// static approximations, not live prices. Deployments with a live source
/// implement `TokenMetadataProvider` and hand it to `TokenClassifier::new`.

use lens_core::TokenCategory;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::config::ClassifierSettings;

pub const UNKNOWN_TOKEN: &str = "UNKNOWN";
const DEFAULT_DECIMALS: u8 = 9;
const DEFAULT_RATE: f64 = 1.0;
const POOL_PREFIX_LEN: usize = 10;

/// Source of token and pool metadata
pub trait TokenMetadataProvider: Send + Sync {
    /// Ordered (token A, token B) symbols of a pool
    fn pool_tokens(&self, pool_id: &str) -> Option<(String, String)>;
    fn token_decimals(&self, symbol: &str) -> Option<u8>;
    /// Conversion rate of one whole token into the common unit
    fn unit_rate(&self, symbol: &str) -> Option<f64>;
    fn token_category(&self, symbol: &str) -> Option<TokenCategory>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenSpec {
    pub decimals: u8,
    pub rate: f64,
    pub category: TokenCategory,
}

/// In-memory lookup tables
#[derive(Debug, Clone, Default)]
pub struct StaticTokenTables {
    tokens: HashMap<String, TokenSpec>,
    pools: HashMap<String, (String, String)>,
}

impl StaticTokenTables {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in mainnet tables
    pub fn builtin() -> Self {
        use TokenCategory::*;

        Self::empty()
            // Native gas token and stablecoins
            .with_token("SUI", 9, 3.5, Major)
            .with_token("USDC", 6, 1.0, Major)
            .with_token("USDT", 6, 1.0, Major)
            .with_token("AUSD", 6, 1.0, Major)
            .with_token("BUCK", 9, 1.0, Major)
            // DeFi governance/utility tokens
            .with_token("CETUS", 9, 0.1, Protocol)
            .with_token("DEEP", 6, 0.15, Protocol)
            .with_token("NAVX", 9, 0.08, Protocol)
            .with_token("SCA", 9, 0.3, Protocol)
            .with_token("TURBOS", 9, 0.002, Protocol)
            .with_token("WETH", 8, 3000.0, Other)
            .with_token("WAL", 9, 0.5, Other)
            // Cetus CLMM mainnet pools
            .with_pool(
                "0xcf994611fd4c48e277ce3ffd4d4364c914af2c3cbb05f7bf6facd371de688630",
                "USDC",
                "SUI",
            )
            .with_pool(
                "0x2e041f3fd93646dcc877f783c1f2b7fa62d30271bdef1f21ef002cebf857bded",
                "CETUS",
                "SUI",
            )
            .with_pool(
                "0xc8d7a1503dc2f9f5b05449a87d8733593e2f0f3e7bffd90541252782e4d2ca20",
                "USDC",
                "USDT",
            )
    }

    /// Built-in tables with the configured entries layered on top
    pub fn from_settings(settings: &ClassifierSettings) -> Self {
        let mut tables = Self::builtin();

        for token in &settings.tokens {
            let key = token.symbol.to_ascii_uppercase();
            let base = tables.tokens.get(&key).copied().unwrap_or(TokenSpec {
                decimals: settings.default_decimals,
                rate: settings.default_rate,
                category: TokenCategory::Other,
            });
            tables.tokens.insert(
                key,
                TokenSpec {
                    decimals: token.decimals.unwrap_or(base.decimals),
                    rate: token.rate.unwrap_or(base.rate),
                    category: token.category.unwrap_or(base.category),
                },
            );
        }

        for pool in &settings.pools {
            tables = tables.with_pool(&pool.id, &pool.token_a, &pool.token_b);
        }

        debug!(
            "Classifier tables: {} tokens, {} pools ({} configured)",
            tables.token_count(),
            tables.pool_count(),
            settings.pools.len()
        );
        tables
    }

    pub fn with_token(mut self, symbol: &str, decimals: u8, rate: f64, category: TokenCategory) -> Self {
        self.tokens.insert(
            symbol.to_ascii_uppercase(),
            TokenSpec { decimals, rate, category },
        );
        self
    }

    pub fn with_pool(mut self, pool_id: &str, token_a: &str, token_b: &str) -> Self {
        self.pools.insert(
            pool_id.to_string(),
            (token_a.to_ascii_uppercase(), token_b.to_ascii_uppercase()),
        );
        self
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    fn spec(&self, symbol: &str) -> Option<&TokenSpec> {
        self.tokens.get(&symbol.to_ascii_uppercase())
    }
}

impl TokenMetadataProvider for StaticTokenTables {
    fn pool_tokens(&self, pool_id: &str) -> Option<(String, String)> {
        self.pools.get(pool_id).cloned()
    }

    fn token_decimals(&self, symbol: &str) -> Option<u8> {
        self.spec(symbol).map(|s| s.decimals)
    }

    fn unit_rate(&self, symbol: &str) -> Option<f64> {
        self.spec(symbol).map(|s| s.rate)
    }

    fn token_category(&self, symbol: &str) -> Option<TokenCategory> {
        self.spec(symbol).map(|s| s.category)
    }
}

/// A pool resolved to its two tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolPair {
    pub pool_id: String,
    pub token_a: String,
    pub token_b: String,
    pub known: bool,
}

impl PoolPair {
    /// "A/B" for known pools, a deterministic placeholder otherwise
    pub fn label(&self) -> String {
        if self.known {
            format!("{}/{}", self.token_a, self.token_b)
        } else {
            let prefix: String = self.pool_id.chars().take(POOL_PREFIX_LEN).collect();
            format!("{}/{} ({}...)", UNKNOWN_TOKEN, UNKNOWN_TOKEN, prefix)
        }
    }

    /// Token sold in a swap through this pool
    pub fn input_token(&self, a_to_b: bool) -> &str {
        if a_to_b {
            &self.token_a
        } else {
            &self.token_b
        }
    }
}

pub struct TokenClassifier {
    provider: Arc<dyn TokenMetadataProvider>,
    default_decimals: u8,
    default_rate: f64,
}

impl TokenClassifier {
    pub fn new(provider: Arc<dyn TokenMetadataProvider>) -> Self {
        Self::with_defaults(provider, DEFAULT_DECIMALS, DEFAULT_RATE)
    }

    pub fn with_defaults(provider: Arc<dyn TokenMetadataProvider>, default_decimals: u8, default_rate: f64) -> Self {
        Self {
            provider,
            default_decimals,
            default_rate,
        }
    }

    pub fn from_settings(settings: &ClassifierSettings) -> Self {
        Self::with_defaults(
            Arc::new(StaticTokenTables::from_settings(settings)),
            settings.default_decimals,
            settings.default_rate,
        )
    }

    pub fn resolve_pool(&self, pool_id: &str) -> PoolPair {
        match self.provider.pool_tokens(pool_id) {
            Some((token_a, token_b)) => PoolPair {
                pool_id: pool_id.to_string(),
                token_a,
                token_b,
                known: true,
            },
            None => {
                debug!("Unknown pool {}, using fallback symbols", pool_id);
                PoolPair {
                    pool_id: pool_id.to_string(),
                    token_a: UNKNOWN_TOKEN.to_string(),
                    token_b: UNKNOWN_TOKEN.to_string(),
                    known: false,
                }
            }
        }
    }

    pub fn categorize(&self, symbol: &str) -> TokenCategory {
        self.provider
            .token_category(symbol)
            .unwrap_or(TokenCategory::Other)
    }

    pub fn decimals(&self, symbol: &str) -> u8 {
        self.provider
            .token_decimals(symbol)
            .unwrap_or(self.default_decimals)
    }

    /// Raw smallest-unit integer string divided by 10^decimals; unparsable input is 0
    pub fn normalize_amount(&self, raw_amount: &str, symbol: &str) -> f64 {
        let raw = match raw_amount.trim().parse::<u128>() {
            Ok(value) => value as f64,
            Err(_) => {
                debug!("Unparsable amount '{}' for {}, treating as zero", raw_amount, symbol);
                return 0.0;
            }
        };
        raw / 10f64.powi(self.decimals(symbol) as i32)
    }

    /// Approximate value in the common unit of account
    pub fn to_common_unit(&self, raw_amount: &str, symbol: &str) -> f64 {
        let rate = self.provider.unit_rate(symbol).unwrap_or(self.default_rate);
        self.normalize_amount(raw_amount, symbol) * rate
    }
}

impl Default for TokenClassifier {
    fn default() -> Self {
        Self::new(Arc::new(StaticTokenTables::builtin()))
    }
}
