//! Shared fixtures for integration tests
//!
//! Manifests are loaded through `ManifestProvider`, so the full discovery
//! engine runs without a cluster.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use kube_mapper::error::{ProviderError, ProviderResult};
use kube_mapper::kube::{ClusterProvider, ManifestProvider};
use kube_mapper::mapper::{DiscoveryCoordinator, DiscoveryOptions, DiscoveryReport};
use kube_mapper::models::{ResourceKind, ResourcePayload};
use tokio_util::sync::CancellationToken;

/// One Deployment behind a Service and an Ingress, with TLS, an IngressClass,
/// an autoscaler and a ConfigMap used three ways
pub const WEB_APP: &str = r#"
apiVersion: networking.k8s.io/v1
kind: IngressClass
metadata:
  name: nginx
spec:
  controller: k8s.io/ingress-nginx
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: default
spec:
  replicas: 2
  selector:
    matchLabels:
      app: web
  template:
    metadata:
      labels:
        app: web
    spec:
      volumes:
        - name: config
          configMap:
            name: web-config
      containers:
        - name: web
          image: nginx:1.25
          ports:
            - name: http
              containerPort: 8080
          envFrom:
            - configMapRef:
                name: web-config
          env:
            - name: LOG_LEVEL
              valueFrom:
                configMapKeyRef:
                  name: web-config
                  key: LOG_LEVEL
status:
  replicas: 2
  readyReplicas: 2
---
apiVersion: v1
kind: Pod
metadata:
  name: web-a
  namespace: default
  labels:
    app: web
spec:
  containers:
    - name: web
      image: nginx:1.25
      ports:
        - name: http
          containerPort: 8080
      envFrom:
        - configMapRef:
            name: web-config
status:
  phase: Running
  conditions:
    - type: Ready
      status: "True"
---
apiVersion: v1
kind: Pod
metadata:
  name: web-b
  namespace: default
  labels:
    app: web
spec:
  containers:
    - name: web
      image: nginx:1.25
      ports:
        - name: http
          containerPort: 8080
      envFrom:
        - configMapRef:
            name: web-config
status:
  phase: Running
  conditions:
    - type: Ready
      status: "True"
---
apiVersion: v1
kind: Service
metadata:
  name: web-svc
  namespace: default
spec:
  clusterIP: 10.0.0.10
  selector:
    app: web
  ports:
    - port: 80
      targetPort: http
---
apiVersion: v1
kind: Endpoints
metadata:
  name: web-svc
  namespace: default
subsets:
  - addresses:
      - ip: 10.1.0.4
      - ip: 10.1.0.5
    ports:
      - port: 8080
---
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: web-ing
  namespace: default
spec:
  ingressClassName: nginx
  tls:
    - hosts:
        - app.example.com
      secretName: web-tls
  rules:
    - host: app.example.com
      http:
        paths:
          - path: /
            pathType: Prefix
            backend:
              service:
                name: web-svc
                port:
                  number: 80
---
apiVersion: v1
kind: Secret
metadata:
  name: web-tls
  namespace: default
type: kubernetes.io/tls
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: web-config
  namespace: default
data:
  LOG_LEVEL: info
  config.yaml: "port: 8080"
---
apiVersion: autoscaling/v2
kind: HorizontalPodAutoscaler
metadata:
  name: web-hpa
  namespace: default
spec:
  minReplicas: 2
  maxReplicas: 5
  scaleTargetRef:
    apiVersion: apps/v1
    kind: Deployment
    name: web
"#;

/// An Ingress whose TLS secret does not exist
pub const MISSING_TLS: &str = r#"
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: shop
  namespace: store
spec:
  tls:
    - hosts:
        - shop.example.com
      secretName: shop-tls
  rules:
    - host: shop.example.com
      http:
        paths:
          - path: /
            pathType: Prefix
            backend:
              service:
                name: shop-svc
                port:
                  number: 80
---
apiVersion: v1
kind: Service
metadata:
  name: shop-svc
  namespace: store
spec:
  clusterIP: 10.0.0.20
  ports:
    - port: 80
"#;

/// A Deployment with an autoscaler in `restricted` plus an unrelated namespace
pub const RESTRICTED: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: api
  namespace: restricted
spec:
  replicas: 3
  selector:
    matchLabels:
      app: api
  template:
    metadata:
      labels:
        app: api
    spec:
      containers:
        - name: api
          image: api:2.0
status:
  readyReplicas: 1
---
apiVersion: autoscaling/v2
kind: HorizontalPodAutoscaler
metadata:
  name: api-hpa
  namespace: restricted
spec:
  maxReplicas: 6
  scaleTargetRef:
    apiVersion: apps/v1
    kind: Deployment
    name: api
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: worker
  namespace: batch
spec:
  replicas: 1
  selector:
    matchLabels:
      app: worker
  template:
    metadata:
      labels:
        app: worker
    spec:
      containers:
        - name: worker
          image: worker:1.0
status:
  readyReplicas: 1
---
apiVersion: autoscaling/v2
kind: HorizontalPodAutoscaler
metadata:
  name: worker-hpa
  namespace: batch
spec:
  minReplicas: 1
  maxReplicas: 4
  scaleTargetRef:
    apiVersion: apps/v1
    kind: Deployment
    name: worker
"#;

pub fn manifest(yaml: &str) -> Arc<dyn ClusterProvider> {
    Arc::new(ManifestProvider::from_yaml_str(yaml).expect("fixture parses"))
}

/// Provider that refuses to list one kind in one namespace
pub struct DenyingProvider {
    inner: ManifestProvider,
    kind: ResourceKind,
    namespace: String,
}

impl DenyingProvider {
    pub fn new(yaml: &str, kind: ResourceKind, namespace: &str) -> Self {
        Self {
            inner: ManifestProvider::from_yaml_str(yaml).expect("fixture parses"),
            kind,
            namespace: namespace.to_string(),
        }
    }
}

#[async_trait]
impl ClusterProvider for DenyingProvider {
    async fn list_namespaces(&self) -> ProviderResult<Vec<String>> {
        self.inner.list_namespaces().await
    }

    async fn list(&self, kind: ResourceKind, namespace: &str) -> ProviderResult<Vec<ResourcePayload>> {
        if kind == self.kind && namespace == self.namespace {
            return Err(ProviderError::PermissionDenied(format!(
                "{} is forbidden in {}",
                kind, namespace
            )));
        }
        self.inner.list(kind, namespace).await
    }

    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> ProviderResult<ResourcePayload> {
        self.inner.get(kind, namespace, name).await
    }
}

pub async fn discover(provider: Arc<dyn ClusterProvider>) -> DiscoveryReport {
    discover_with(provider, DiscoveryOptions::default()).await
}

pub async fn discover_with(
    provider: Arc<dyn ClusterProvider>,
    options: DiscoveryOptions,
) -> DiscoveryReport {
    DiscoveryCoordinator::new(provider, CancellationToken::new(), options)
        .discover(None, &[])
        .await
        .expect("discovery succeeds")
}

/// Remove ANSI SGR escape sequences
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}
