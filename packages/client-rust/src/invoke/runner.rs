//! The invocation runner: one scoped channel per call, classified failures,
//! guaranteed teardown.

use std::any::Any;
use std::error::Error as StdError;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::BoxFuture;
use futures_util::FutureExt as _;
use relaycall_core::{
    error_chain, AuthToken, ConfigError, ConfigurationProvider, Endpoint, ErrorLogger,
    ServiceIdentity, SharedAccessSignatureProvider, SharedKey, TokenProvider,
};
use tracing::{info_span, Instrument};

use super::outcome::{classify, FailureKind, FailureStage, InvocationFailure, InvocationOutcome};
use super::scope::FactoryScope;
use crate::channel::{Channel, ChannelFactory, ChannelOf, Transport};

/// Errors that escape an invocation. Both are raised before any channel
/// resource is allocated and are never logged by the runner.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("missing required argument `{argument}`")]
    InvalidArgument { argument: &'static str },
    #[error(transparent)]
    InvalidConfiguration(#[from] ConfigError),
}

/// Raised in place of a panic that escaped the caller's operation.
#[derive(Debug, thiserror::Error)]
#[error("operation panicked: {message}")]
pub struct OperationPanicked {
    pub message: String,
}

impl OperationPanicked {
    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self { message }
    }
}

/// Runs single remote operations against relay-hosted services.
///
/// Every call builds its own channel factory and channel; nothing is pooled or
/// shared between calls, so a runner can be used concurrently without locking.
/// Failures after resource acquisition are classified, reported through the
/// injected [`ErrorLogger`], and returned as an [`InvocationOutcome`] rather
/// than as an error.
pub struct InvocationRunner<T: Transport> {
    transport: T,
    config: Arc<dyn ConfigurationProvider>,
    logger: Arc<dyn ErrorLogger>,
    tokens: Arc<dyn TokenProvider>,
}

impl<T: Transport> InvocationRunner<T> {
    #[must_use]
    pub fn builder() -> InvocationRunnerBuilder<T> {
        InvocationRunnerBuilder::default()
    }

    /// Invokes `operation` on `service_name` within the configured namespace.
    ///
    /// # Errors
    ///
    /// Only [`InvocationError::InvalidConfiguration`], when the namespace,
    /// scheme, service name, or shared key is malformed.
    pub async fn invoke<Op, R>(
        &self,
        service_name: &str,
        operation: Op,
    ) -> Result<InvocationOutcome, InvocationError>
    where
        Op: for<'c> FnOnce(&'c ChannelOf<T>) -> BoxFuture<'c, anyhow::Result<R>> + Send,
    {
        let identity = ServiceIdentity::from_config(self.config.as_ref(), service_name);
        self.invoke_with(&identity, self.config.shared_key(), operation)
            .await
    }

    /// Invokes `operation` on an explicit identity signed with `shared_key`.
    ///
    /// Steps: resolve the endpoint, sign a token, acquire factory and channel
    /// in a scope, run the operation, then close the channel, release it, and
    /// dispose the factory, in that order, whatever happened before.
    ///
    /// # Errors
    ///
    /// Only [`InvocationError::InvalidConfiguration`].
    pub async fn invoke_with<Op, R>(
        &self,
        identity: &ServiceIdentity,
        shared_key: &SharedKey,
        operation: Op,
    ) -> Result<InvocationOutcome, InvocationError>
    where
        Op: for<'c> FnOnce(&'c ChannelOf<T>) -> BoxFuture<'c, anyhow::Result<R>> + Send,
    {
        let endpoint = identity.endpoint()?;
        let token = self.tokens.create_token(shared_key, identity)?;

        let span = info_span!(
            "invoke",
            service = identity.service_name(),
            endpoint = %endpoint,
            outcome = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );

        async move {
            let start = Instant::now();
            let outcome = self.run_scoped(identity, &endpoint, token, operation).await;
            let elapsed = start.elapsed();

            let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            let span = tracing::Span::current();
            span.record("outcome", outcome.label());
            span.record("duration_ms", duration_ms);
            tracing::info!(outcome = outcome.label(), duration_ms, "invocation complete");

            let service = identity.service_name().to_string();
            metrics::counter!(
                "relaycall_invocations_total",
                "service" => service.clone(),
                "outcome" => outcome.label()
            )
            .increment(1);
            metrics::histogram!(
                "relaycall_invocation_duration_seconds",
                "service" => service
            )
            .record(elapsed.as_secs_f64());

            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    async fn run_scoped<Op, R>(
        &self,
        identity: &ServiceIdentity,
        endpoint: &Endpoint,
        token: AuthToken,
        operation: Op,
    ) -> InvocationOutcome
    where
        Op: for<'c> FnOnce(&'c ChannelOf<T>) -> BoxFuture<'c, anyhow::Result<R>> + Send,
    {
        let factory = match self.transport.open_factory() {
            Ok(factory) => factory,
            Err(e) => return self.report(FailureStage::Acquire, identity, endpoint, e.into()),
        };
        let mut scope = FactoryScope::new(factory);

        let channel = match scope.factory_mut().create_channel(identity, endpoint, token) {
            Ok(channel) => channel,
            Err(e) => {
                let outcome = self.report(FailureStage::Acquire, identity, endpoint, e.into());
                scope.dispose();
                return outcome;
            }
        };

        let borrowed = &channel;
        let result = AssertUnwindSafe(async move { operation(borrowed).await })
            .catch_unwind()
            .await;
        let mut outcome = match result {
            Ok(Ok(_)) => InvocationOutcome::Success,
            Ok(Err(error)) => self.report(FailureStage::Operation, identity, endpoint, error),
            Err(payload) => {
                let panicked = OperationPanicked::from_payload(&*payload);
                self.report(FailureStage::Operation, identity, endpoint, panicked.into())
            }
        };

        if let Err(error) = channel.close().await {
            let closed = self.report(FailureStage::Close, identity, endpoint, error);
            if outcome.is_success() {
                outcome = closed;
            }
        }
        drop(channel);
        scope.dispose();

        outcome
    }

    /// Classifies `error`, reports it, and wraps it into an outcome.
    fn report(
        &self,
        stage: FailureStage,
        identity: &ServiceIdentity,
        endpoint: &Endpoint,
        error: anyhow::Error,
    ) -> InvocationOutcome {
        let kind = classify(&error);
        let source: &(dyn StdError + 'static) = error.as_ref();
        match kind {
            FailureKind::Communication => self.logger.write_error(&format!(
                "communication failure during {stage} with service '{}' at {endpoint}: {}",
                identity.service_name(),
                error_chain(source),
            )),
            FailureKind::Unexpected => self.logger.write_error_with(
                source,
                &format!(
                    "unexpected failure during {stage} with service '{}' at {endpoint}",
                    identity.service_name(),
                ),
            ),
        }

        InvocationOutcome::failed(
            kind,
            InvocationFailure {
                stage,
                service_name: identity.service_name().to_string(),
                endpoint: endpoint.to_string(),
                error,
            },
        )
    }
}

/// Collects the collaborators of an [`InvocationRunner`].
///
/// The transport, configuration, and logger are required; the token provider
/// defaults to [`SharedAccessSignatureProvider`].
pub struct InvocationRunnerBuilder<T> {
    transport: Option<T>,
    config: Option<Arc<dyn ConfigurationProvider>>,
    logger: Option<Arc<dyn ErrorLogger>>,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl<T> Default for InvocationRunnerBuilder<T> {
    fn default() -> Self {
        Self {
            transport: None,
            config: None,
            logger: None,
            tokens: None,
        }
    }
}

impl<T: Transport> InvocationRunnerBuilder<T> {
    #[must_use]
    pub fn transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn config(mut self, config: Arc<dyn ConfigurationProvider>) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    #[must_use]
    pub fn token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// # Errors
    ///
    /// Returns [`InvocationError::InvalidArgument`] naming the first missing
    /// collaborator. No factory is opened either way.
    pub fn build(self) -> Result<InvocationRunner<T>, InvocationError> {
        let logger = self
            .logger
            .ok_or(InvocationError::InvalidArgument { argument: "logger" })?;
        let config = self
            .config
            .ok_or(InvocationError::InvalidArgument { argument: "config" })?;
        let transport = self
            .transport
            .ok_or(InvocationError::InvalidArgument { argument: "transport" })?;
        let tokens = self
            .tokens
            .unwrap_or_else(|| Arc::new(SharedAccessSignatureProvider::default()));

        Ok(InvocationRunner {
            transport,
            config,
            logger,
            tokens,
        })
    }
}
