//! Decorators that put instrumentation around a client factory and its clients.

use std::sync::Arc;

use crate::client::{ClientFactory, DataTask, HttpClient, TaskObserver, TaskRequest};
use crate::intercept::observer::InstrumentedObserver;
use crate::intercept::Interceptor;

/// A `ClientFactory` whose clients are observed by an `Interceptor`.
///
/// Without an interceptor it passes everything straight through.
pub struct InstrumentedFactory<F> {
    inner: F,
    interceptor: Option<Arc<Interceptor>>,
}

impl<F: ClientFactory> InstrumentedFactory<F> {
    pub(crate) fn new(inner: F, interceptor: Arc<Interceptor>) -> Self {
        if inner.is_instrumented() {
            tracing::debug!("Factory already instrumented, not wrapping again");
            return Self::passthrough(inner);
        }
        Self {
            inner,
            interceptor: Some(interceptor),
        }
    }

    /// A wrapper that adds no instrumentation.
    pub fn passthrough(inner: F) -> Self {
        Self {
            inner,
            interceptor: None,
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: ClientFactory> ClientFactory for InstrumentedFactory<F> {
    type Client = InstrumentedClient<F::Client>;

    fn build(&self, observer: Option<Arc<dyn TaskObserver>>) -> Self::Client {
        match &self.interceptor {
            Some(interceptor) => {
                let instrumentation = Arc::new(interceptor.observer(observer));
                let inner = self.inner.build(Some(instrumentation.clone() as Arc<dyn TaskObserver>));
                InstrumentedClient {
                    inner,
                    instrumentation: Some(instrumentation),
                }
            }
            None => InstrumentedClient {
                inner: self.inner.build(observer),
                instrumentation: None,
            },
        }
    }

    fn is_instrumented(&self) -> bool {
        self.interceptor.is_some() || self.inner.is_instrumented()
    }
}

/// A client whose task creation is seen by the instrumentation.
pub struct InstrumentedClient<C> {
    inner: C,
    instrumentation: Option<Arc<InstrumentedObserver>>,
}

impl<C> InstrumentedClient<C> {
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// The observer recording this client's tasks, if instrumented.
    pub fn instrumentation(&self) -> Option<&Arc<InstrumentedObserver>> {
        self.instrumentation.as_ref()
    }
}

impl<C: HttpClient> HttpClient for InstrumentedClient<C> {
    fn data_task(&self, request: TaskRequest) -> Arc<DataTask> {
        let task = self.inner.data_task(request);
        if let Some(instrumentation) = &self.instrumentation {
            instrumentation.did_create_task(&task);
        }
        task
    }

    fn resume(&self, task: &Arc<DataTask>) {
        self.inner.resume(task);
    }

    /// The observer the caller built this client with, never the instrumentation.
    fn observer(&self) -> Option<Arc<dyn TaskObserver>> {
        match &self.instrumentation {
            Some(instrumentation) => instrumentation.original().cloned(),
            None => self.inner.observer(),
        }
    }
}
