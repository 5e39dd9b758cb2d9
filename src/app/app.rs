use axum::{Router, http::StatusCode, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::config::{AccessConfig, AppConfig, JwtConfig, MongoConfig, ReportConfig, StoreBackend};
use crate::middlewares::access_guard::AccessGuard;
use crate::middlewares::auth_middleware::AuthState;
use crate::repository::bill_repo::{BillRepository, MongoBillRepository};
use crate::repository::database;
use crate::repository::memory_store::MemoryStore;
use crate::repository::paid_bill_repo::{MongoPaidBillRepository, PaidBillRepository};
use crate::repository::repository_error::RepositoryResult;
use crate::repository::user_repo::{UserRepository, UserRepositoryImpl};
use crate::router::bill_router::bill_router;
use crate::router::paid_bill_router::paid_bill_router;
use crate::router::stats_router::stats_router;
use crate::router::user_router::user_router;
use crate::service::bill_service::{BillService, BillServiceImpl};
use crate::service::paid_bill_service::{PaidBillService, PaidBillServiceImpl};
use crate::service::stats_service::{StatsService, StatsServiceImpl};
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::identity::{IdentityVerifier, JwtIdentityVerifier};

/// One handle per collection, whichever backend serves them.
#[derive(Clone)]
pub struct Stores {
    pub bills: Arc<dyn BillRepository>,
    pub paid_bills: Arc<dyn PaidBillRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Stores {
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Stores {
            bills: store.clone(),
            paid_bills: store.clone(),
            users: store,
        }
    }

    pub async fn mongo(config: &MongoConfig) -> RepositoryResult<Self> {
        let db = database::connect(config).await?;
        database::ensure_indexes(&db, config).await?;
        Ok(Stores {
            bills: Arc::new(MongoBillRepository::new(&db, config)),
            paid_bills: Arc::new(MongoPaidBillRepository::new(&db, config)),
            users: Arc::new(UserRepositoryImpl::new(&db, config)),
        })
    }
}

pub struct AppServices {
    pub bill_service: Arc<dyn BillService>,
    pub paid_bill_service: Arc<dyn PaidBillService>,
    pub user_service: Arc<dyn UserService>,
    pub stats_service: Arc<dyn StatsService>,
    pub auth_state: Arc<AuthState>,
}

impl AppServices {
    pub fn new(
        stores: Stores,
        verifier: Arc<dyn IdentityVerifier>,
        access_config: &AccessConfig,
        report_config: ReportConfig,
    ) -> Self {
        let guard = Arc::new(AccessGuard::new(stores.users.clone(), access_config));
        AppServices {
            bill_service: Arc::new(BillServiceImpl::new(stores.bills.clone())),
            paid_bill_service: Arc::new(PaidBillServiceImpl::new(stores.paid_bills.clone(), guard.clone())),
            user_service: Arc::new(UserServiceImpl::new(stores.users.clone())),
            stats_service: Arc::new(StatsServiceImpl::new(
                stores.bills,
                stores.paid_bills,
                stores.users,
                report_config,
            )),
            auth_state: Arc::new(AuthState { verifier, guard }),
        }
    }
}

/// Requests still running after `timeout` are answered with 408.
pub fn request_timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

pub fn create_router(services: &AppServices, request_timeout: Duration) -> Router {
    Router::new()
        .merge(bill_router(services.bill_service.clone(), services.auth_state.clone()))
        .merge(paid_bill_router(services.paid_bill_service.clone(), services.auth_state.clone()))
        .merge(user_router(services.user_service.clone(), services.auth_state.clone()))
        .merge(stats_router(services.stats_service.clone(), services.auth_state.clone()))
        .route("/", get(|| async { "Smart bills server is running..." }))
        .route("/health", get(|| async { "OK" }))
        .layer(request_timeout_layer(request_timeout))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: Duration, _span: &tracing::Span| {
                        let status = res.status();
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        )
}

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = AppConfig::from_env()?;
        let jwt_config = JwtConfig::from_env()?;
        let access_config = AccessConfig::from_env()?;
        let report_config = ReportConfig::from_env()?;

        let stores = match config.store_backend {
            StoreBackend::Mongo => {
                let mongo_config = MongoConfig::from_env()?;
                Stores::mongo(&mongo_config).await?
            }
            StoreBackend::Memory => {
                info!("Using the in-memory store, data is lost on restart");
                Stores::memory()
            }
        };

        let verifier: Arc<dyn IdentityVerifier> = Arc::new(JwtIdentityVerifier::new(jwt_config));
        let services = AppServices::new(stores, verifier, &access_config, report_config);
        let router = create_router(&services, config.request_timeout());
        Ok(App { config, router })
    }

    pub async fn start(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = SocketAddr::new(self.config.host.parse()?, self.config.port);
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
