use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use spotprice_core::{Credentials, Source, SpotError};
use url::Url;

use crate::payload::{AwattarResponse, EnergyAssistantResponse, LoginResponse, StwHasResponse};

/// aWATTar market data abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait AwattarApi: Send + Sync {
    /// Fetch market data for `[start_ms, end_ms)`.
    async fn marketdata(
        &self,
        market_area: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<AwattarResponse, SpotError>;
}

/// Stadtwerk Haßfurt EEX feed abstraction.
#[async_trait]
pub trait StwHasApi: Send + Sync {
    /// Fetch the current EEX price list for the given account.
    async fn eex_data(&self, credentials: &Credentials) -> Result<StwHasResponse, SpotError>;
}

/// Energy Assistant abstraction: token login followed by a date-ranged query.
#[async_trait]
pub trait EnergyAssistantApi: Send + Sync {
    /// Log in and return a bearer token.
    async fn login(&self, market_area: &str, credentials: &Credentials)
    -> Result<String, SpotError>;

    /// Fetch hourly values between two local wall-clock instants.
    async fn mapped_values(
        &self,
        market_area: &str,
        token: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<EnergyAssistantResponse, SpotError>;
}

/// Energy Assistant API host per market area.
pub const ENERGY_ASSISTANT_DOMAINS: &[(&str, &str)] =
    &[("Haßfurt", "hassfurt.energy-assistant.de")];

/// Endpoint templates used by [`RealAdapter`].
///
/// `{market_area}` and `{domain}` placeholders are substituted per request; templates without
/// placeholders are used verbatim, which is how tests point adapters at a local server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// aWATTar market data URL.
    pub awattar: String,
    /// Stadtwerk Haßfurt EEX price URL.
    pub stwhas: String,
    /// Energy Assistant base URL (login and data paths are appended).
    pub energy_assistant: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            awattar: "https://api.awattar.{market_area}/v1/marketdata".into(),
            stwhas: "https://api.stadtwerk-hassfurt.de/eex/v1/prices".into(),
            energy_assistant: "https://{domain}".into(),
        }
    }
}

impl Endpoints {
    /// Point every source at `base`, keeping the production paths.
    #[must_use]
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            awattar: format!("{base}/v1/marketdata"),
            stwhas: format!("{base}/eex/v1/prices"),
            energy_assistant: base.to_string(),
        }
    }

    fn resolve(template: &str, provider: &str) -> Result<Url, SpotError> {
        Url::parse(template)
            .map_err(|e| SpotError::InvalidArg(format!("{provider} endpoint {template:?}: {e}")))
    }

    fn awattar_url(&self, market_area: &str) -> Result<Url, SpotError> {
        let url = self.awattar.replace("{market_area}", market_area);
        Self::resolve(&url, Source::Awattar.display_name())
    }

    fn stwhas_url(&self) -> Result<Url, SpotError> {
        Self::resolve(&self.stwhas, Source::StwHas.display_name())
    }

    fn energy_assistant_url(&self, market_area: &str, path: &str) -> Result<Url, SpotError> {
        let provider = Source::EnergyAssistant.display_name();
        let domain = ENERGY_ASSISTANT_DOMAINS
            .iter()
            .find(|(area, _)| *area == market_area)
            .map(|(_, domain)| *domain)
            .ok_or_else(|| {
                SpotError::InvalidArg(format!("{provider} has no host for {market_area:?}"))
            })?;
        let base = self.energy_assistant.replace("{domain}", domain);
        Self::resolve(&format!("{}{path}", base.trim_end_matches('/')), provider)
    }
}

/// Production adapter backed by `reqwest`.
#[derive(Clone)]
pub struct RealAdapter {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl RealAdapter {
    /// Wrap an existing client with explicit endpoints.
    #[must_use]
    pub const fn new(http: reqwest::Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    /// Build a client with the crate user agent and production endpoints.
    ///
    /// # Errors
    /// Returns `SpotError::Other` if the HTTP client cannot be constructed (TLS backend
    /// initialization failure).
    pub fn try_new_default() -> Result<Self, SpotError> {
        Self::try_with_endpoints(Endpoints::default())
    }

    /// Build a client with the crate user agent and the given endpoints.
    ///
    /// # Errors
    /// Same as [`RealAdapter::try_new_default`].
    pub fn try_with_endpoints(endpoints: Endpoints) -> Result<Self, SpotError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("spotprice/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SpotError::Other(e.to_string()))?;
        Ok(Self::new(http, endpoints))
    }

    /// Endpoints this adapter talks to.
    #[must_use]
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn send_json<T: DeserializeOwned>(
        req: reqwest::RequestBuilder,
        provider: &str,
    ) -> Result<T, SpotError> {
        let resp = req
            .send()
            .await
            .map_err(|e| map_reqwest_err(&e, provider))?
            .error_for_status()
            .map_err(|e| map_reqwest_err(&e, provider))?;
        let body = resp
            .bytes()
            .await
            .map_err(|e| map_reqwest_err(&e, provider))?;
        serde_json::from_slice(&body)
            .map_err(|e| SpotError::data_format(provider, format!("unexpected payload: {e}")))
    }
}

fn map_reqwest_err(e: &reqwest::Error, provider: &str) -> SpotError {
    #[cfg(feature = "tracing")]
    tracing::debug!(provider, status = ?e.status(), error = %e, "provider request failed");
    match e.status() {
        Some(status) => SpotError::fetch(provider, format!("HTTP status {status}")),
        None => SpotError::fetch(provider, e.to_string()),
    }
}

#[async_trait]
impl AwattarApi for RealAdapter {
    async fn marketdata(
        &self,
        market_area: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<AwattarResponse, SpotError> {
        let url = self.endpoints.awattar_url(market_area)?;
        let req = self
            .http
            .get(url)
            .query(&[("start", start_ms), ("end", end_ms)]);
        Self::send_json(req, Source::Awattar.display_name()).await
    }
}

#[async_trait]
impl StwHasApi for RealAdapter {
    async fn eex_data(&self, credentials: &Credentials) -> Result<StwHasResponse, SpotError> {
        let url = self.endpoints.stwhas_url()?;
        let req = self
            .http
            .get(url)
            .basic_auth(&credentials.username, Some(&credentials.password));
        Self::send_json(req, Source::StwHas.display_name()).await
    }
}

#[async_trait]
impl EnergyAssistantApi for RealAdapter {
    async fn login(
        &self,
        market_area: &str,
        credentials: &Credentials,
    ) -> Result<String, SpotError> {
        let url = self
            .endpoints
            .energy_assistant_url(market_area, "/api/auth/v1/customer/login")?;
        let body = serde_json::json!({
            "email": credentials.username,
            "password": credentials.password,
        });
        let req = self.http.post(url).json(&body);
        let login: LoginResponse =
            Self::send_json(req, Source::EnergyAssistant.display_name()).await?;
        Ok(login.token)
    }

    async fn mapped_values(
        &self,
        market_area: &str,
        token: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<EnergyAssistantResponse, SpotError> {
        let path = format!(
            "/api/stockmarket/v1/mapped-values/startdate/{}Z/enddate/{}Z/interval/hour",
            start.format("%Y-%m-%dT%H:%M:%S"),
            end.format("%Y-%m-%dT%H:%M:%S"),
        );
        let url = self.endpoints.energy_assistant_url(market_area, &path)?;
        let req = self.http.get(url).bearer_auth(token);
        Self::send_json(req, Source::EnergyAssistant.display_name()).await
    }
}

impl dyn AwattarApi {
    /// Test helper that builds an `AwattarApi` from a closure over
    /// `(market_area, start_ms, end_ms)`.
    pub fn from_fn<F>(f: F) -> Arc<dyn AwattarApi>
    where
        F: Fn(&str, i64, i64) -> Result<AwattarResponse, SpotError> + Send + Sync + 'static,
    {
        struct FnAwattar<F>(F);
        #[async_trait]
        impl<F> AwattarApi for FnAwattar<F>
        where
            F: Fn(&str, i64, i64) -> Result<AwattarResponse, SpotError> + Send + Sync + 'static,
        {
            async fn marketdata(
                &self,
                market_area: &str,
                start_ms: i64,
                end_ms: i64,
            ) -> Result<AwattarResponse, SpotError> {
                (self.0)(market_area, start_ms, end_ms)
            }
        }
        Arc::new(FnAwattar(f))
    }
}

impl dyn StwHasApi {
    /// Test helper that builds a `StwHasApi` from a closure over the credentials.
    pub fn from_fn<F>(f: F) -> Arc<dyn StwHasApi>
    where
        F: Fn(&Credentials) -> Result<StwHasResponse, SpotError> + Send + Sync + 'static,
    {
        struct FnStwHas<F>(F);
        #[async_trait]
        impl<F> StwHasApi for FnStwHas<F>
        where
            F: Fn(&Credentials) -> Result<StwHasResponse, SpotError> + Send + Sync + 'static,
        {
            async fn eex_data(
                &self,
                credentials: &Credentials,
            ) -> Result<StwHasResponse, SpotError> {
                (self.0)(credentials)
            }
        }
        Arc::new(FnStwHas(f))
    }
}

impl dyn EnergyAssistantApi {
    /// Test helper that builds an `EnergyAssistantApi` from a login closure and a data
    /// closure over `(token, start, end)`.
    pub fn from_fns<FLogin, FValues>(
        login: FLogin,
        values: FValues,
    ) -> Arc<dyn EnergyAssistantApi>
    where
        FLogin: Fn(&Credentials) -> Result<String, SpotError> + Send + Sync + 'static,
        FValues: Fn(&str, NaiveDateTime, NaiveDateTime)
                -> Result<EnergyAssistantResponse, SpotError>
            + Send
            + Sync
            + 'static,
    {
        struct FnEnergyAssistant<FLogin, FValues> {
            login: FLogin,
            values: FValues,
        }
        #[async_trait]
        impl<FLogin, FValues> EnergyAssistantApi for FnEnergyAssistant<FLogin, FValues>
        where
            FLogin: Fn(&Credentials) -> Result<String, SpotError> + Send + Sync + 'static,
            FValues: Fn(&str, NaiveDateTime, NaiveDateTime)
                    -> Result<EnergyAssistantResponse, SpotError>
                + Send
                + Sync
                + 'static,
        {
            async fn login(
                &self,
                _market_area: &str,
                credentials: &Credentials,
            ) -> Result<String, SpotError> {
                (self.login)(credentials)
            }

            async fn mapped_values(
                &self,
                _market_area: &str,
                token: &str,
                start: NaiveDateTime,
                end: NaiveDateTime,
            ) -> Result<EnergyAssistantResponse, SpotError> {
                (self.values)(token, start, end)
            }
        }
        Arc::new(FnEnergyAssistant { login, values })
    }
}
