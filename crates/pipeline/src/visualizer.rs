use crate::config::VisualizerConfig;
use crate::provider::CapabilityProvider;
use crate::segmenter::Segmenter;
use futures::future::{AbortHandle, AbortRegistration, Abortable};
use segviz_core::{Error, PointCloud, Result};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info};

/// Per-frame driver: segment the configured source, then overlay.
///
/// Holds no per-frame state; concurrent calls each build their own cluster
/// set, palette and merged cloud.
pub struct Visualizer {
    config: VisualizerConfig,
    segmenter: Arc<dyn Segmenter>,
}

impl Visualizer {
    pub fn new(config: VisualizerConfig, segmenter: Arc<dyn Segmenter>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, segmenter })
    }

    /// Validates `config` and acquires its segmentation service from `provider`.
    pub fn from_provider(
        config: VisualizerConfig,
        provider: &dyn CapabilityProvider,
    ) -> Result<Self> {
        let segmenter = acquire(&config, provider)?;
        info!(
            camera = %config.camera_name,
            service = %config.vision_service_name,
            "visualizer configured"
        );
        Ok(Self { config, segmenter })
    }

    /// Swaps in a new configuration. On failure the current one stays.
    pub fn reconfigure(
        &mut self,
        config: VisualizerConfig,
        provider: &dyn CapabilityProvider,
    ) -> Result<()> {
        let segmenter = acquire(&config, provider)?;
        info!(
            camera = %config.camera_name,
            service = %config.vision_service_name,
            "visualizer reconfigured"
        );
        self.config = config;
        self.segmenter = segmenter;
        Ok(())
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Produces the merged overlay cloud for the next frame.
    pub async fn next_point_cloud(&self) -> Result<PointCloud> {
        let (_handle, registration) = AbortHandle::new_pair();
        self.next_point_cloud_with_cancel(registration).await
    }

    /// Like [`next_point_cloud`](Self::next_point_cloud), but aborts with
    /// `Cancelled` when the paired [`AbortHandle`] fires during segmentation.
    ///
    /// The overlay itself runs on the blocking pool.
    pub async fn next_point_cloud_with_cancel(
        &self,
        cancel: AbortRegistration,
    ) -> Result<PointCloud> {
        let clusters = self.object_clusters(cancel).await?;
        debug!(
            camera = %self.config.camera_name,
            clusters = clusters.len(),
            "received segmentation clusters"
        );
        match task::spawn_blocking(move || segviz_overlay::overlay_frame(&clusters)).await {
            Ok(merged) => merged,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(Error::Cancelled(format!("overlay task did not finish: {e}"))),
        }
    }

    async fn object_clusters(&self, cancel: AbortRegistration) -> Result<Vec<PointCloud>> {
        let source_id = &self.config.camera_name;
        let call = Abortable::new(
            self.segmenter
                .object_clusters(source_id, &self.config.segmentation_options),
            cancel,
        );

        let outcome = match self.config.deadline() {
            Some(deadline) => tokio::time::timeout(deadline, call).await.map_err(|_| {
                Error::Cancelled(format!(
                    "segmentation of {source_id:?} missed its {deadline:?} deadline"
                ))
            })?,
            None => call.await,
        };

        outcome
            .map_err(|_| {
                Error::Cancelled(format!("segmentation of {source_id:?} cancelled by caller"))
            })?
            .map_err(|e| Error::UpstreamUnavailable {
                source_id: source_id.clone(),
                source: Box::new(e),
            })
    }

    /// Releases the segmentation handle.
    pub async fn close(&self) -> Result<()> {
        info!(service = %self.config.vision_service_name, "closing visualizer");
        self.segmenter
            .close()
            .await
            .map_err(|e| Error::UpstreamUnavailable {
                source_id: self.config.vision_service_name.clone(),
                source: Box::new(e),
            })
    }
}

fn acquire(
    config: &VisualizerConfig,
    provider: &dyn CapabilityProvider,
) -> Result<Arc<dyn Segmenter>> {
    config.validate()?;
    provider
        .segmenter(&config.vision_service_name)
        .map_err(|e| Error::UpstreamUnavailable {
            source_id: config.vision_service_name.clone(),
            source: Box::new(e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;
    use crate::segmenter::{SegmentationError, SegmentationOptions};
    use async_trait::async_trait;
    use segviz_core::{Colors, ErrorKind, Rgba};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Behavior {
        Clusters(Vec<PointCloud>),
        Fail,
        TimeOut,
        Hang,
    }

    struct FakeSegmenter {
        behavior: Behavior,
        calls: AtomicUsize,
        closed: AtomicUsize,
    }

    impl FakeSegmenter {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
                closed: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Segmenter for FakeSegmenter {
        async fn object_clusters(
            &self,
            source_id: &str,
            _options: &SegmentationOptions,
        ) -> std::result::Result<Vec<PointCloud>, SegmentationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(source_id, "cam");
            match &self.behavior {
                Behavior::Clusters(c) => Ok(c.clone()),
                Behavior::Fail => Err(SegmentationError::Unavailable("connection refused".into())),
                Behavior::TimeOut => Err(SegmentationError::Timeout(Duration::from_secs(5))),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(Vec::new())
                }
            }
        }

        async fn close(&self) -> std::result::Result<(), SegmentationError> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn single(p: [f32; 3], c: [u8; 3]) -> PointCloud {
        PointCloud::from_xyzrgb(
            vec![p[0]],
            vec![p[1]],
            vec![p[2]],
            Colors::from_rgb(vec![c[0]], vec![c[1]], vec![c[2]]),
        )
    }

    fn visualizer(behavior: Behavior) -> (Visualizer, Arc<FakeSegmenter>) {
        let fake = FakeSegmenter::new(behavior);
        let viz = Visualizer::new(VisualizerConfig::new("cam", "seg"), fake.clone()).unwrap();
        (viz, fake)
    }

    #[tokio::test]
    async fn frame_overlays_every_cluster() {
        let (viz, fake) = visualizer(Behavior::Clusters(vec![
            single([0.0, 0.0, 0.0], [200, 0, 0]),
            single([1.0, 1.0, 1.0], [0, 200, 0]),
        ]));
        let cloud = viz.next_point_cloud().await.unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
        assert!(cloud.get([0.0, 0.0, 0.0]).is_some());
    }

    #[tokio::test]
    async fn no_clusters_is_empty_cloud() {
        let (viz, _) = visualizer(Behavior::Clusters(Vec::new()));
        assert!(viz.next_point_cloud().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_names_source() {
        let (viz, _) = visualizer(Behavior::Fail);
        let err = viz.next_point_cloud().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(err.to_string().contains("\"cam\""), "{err}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn upstream_timeout_is_unavailable() {
        let (viz, _) = visualizer(Behavior::TimeOut);
        let err = viz.next_point_cloud().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }

    #[tokio::test]
    async fn caller_cancellation_aborts_frame() {
        let (viz, _) = visualizer(Behavior::Hang);
        let (handle, registration) = AbortHandle::new_pair();
        handle.abort();
        let err = viz.next_point_cloud_with_cancel(registration).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn cancellation_interrupts_call_in_flight() {
        let (viz, fake) = visualizer(Behavior::Hang);
        let (handle, registration) = AbortHandle::new_pair();

        let (result, _) = tokio::join!(viz.next_point_cloud_with_cancel(registration), async {
            while fake.calls.load(Ordering::SeqCst) == 0 {
                tokio::task::yield_now().await;
            }
            handle.abort();
        });

        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Cancelled);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn overlay_leaves_the_executor_free() {
        let clusters: Vec<PointCloud> = (0..16)
            .map(|k| {
                let n = 2_000;
                PointCloud::from_xyzrgb(
                    (0..n).map(|i| k as f32 * 10.0 + i as f32 * 0.001).collect(),
                    vec![0.0; n],
                    vec![0.0; n],
                    Colors::from_rgb(vec![40; n], vec![80; n], vec![120; n]),
                )
            })
            .collect();
        let (viz, _) = visualizer(Behavior::Clusters(clusters));

        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = tokio::spawn({
            let ticks = ticks.clone();
            async move {
                loop {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            }
        });

        let before = ticks.load(Ordering::SeqCst);
        let cloud = viz.next_point_cloud().await.unwrap();
        let during = ticks.load(Ordering::SeqCst) - before;
        ticker.abort();

        assert_eq!(cloud.len(), 32_000);
        assert!(during > 0, "ticker starved while the overlay ran");
    }

    #[tokio::test]
    async fn deadline_expiry_is_cancelled() {
        let fake = FakeSegmenter::new(Behavior::Hang);
        let mut cfg = VisualizerConfig::new("cam", "seg");
        cfg.deadline_ms = Some(20);
        let viz = Visualizer::new(cfg, fake).unwrap();
        let err = viz.next_point_cloud().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn uncolored_cluster_fails_frame() {
        let (viz, _) = visualizer(Behavior::Clusters(vec![PointCloud::from_xyz(
            vec![0.0],
            vec![0.0],
            vec![0.0],
        )]));
        let err = viz.next_point_cloud().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedColorFormat);
    }

    #[tokio::test]
    async fn provider_resolves_and_close_releases() {
        let fake = FakeSegmenter::new(Behavior::Clusters(vec![single(
            [0.0, 0.0, 0.0],
            [10, 10, 10],
        )]));
        let provider = StaticProvider::new().with_segmenter("seg", fake.clone());
        let viz =
            Visualizer::from_provider(VisualizerConfig::new("cam", "seg"), &provider).unwrap();
        let cloud = viz.next_point_cloud().await.unwrap();
        assert_ne!(cloud.get([0.0, 0.0, 0.0]), Some(Rgba::opaque(10, 10, 10)));
        viz.close().await.unwrap();
        assert_eq!(fake.closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_service_fails_acquisition() {
        let provider = StaticProvider::new();
        let err = Visualizer::from_provider(VisualizerConfig::new("cam", "missing"), &provider)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }

    #[test]
    fn failed_reconfigure_keeps_current_config() {
        let provider =
            StaticProvider::new().with_segmenter("seg", FakeSegmenter::new(Behavior::Fail));
        let mut viz =
            Visualizer::from_provider(VisualizerConfig::new("cam", "seg"), &provider).unwrap();
        assert!(viz
            .reconfigure(VisualizerConfig::new("", "seg"), &provider)
            .is_err());
        assert_eq!(viz.config().camera_name, "cam");

        viz.reconfigure(VisualizerConfig::new("cam2", "seg"), &provider)
            .unwrap();
        assert_eq!(viz.config().camera_name, "cam2");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let fake = FakeSegmenter::new(Behavior::Fail);
        let err = Visualizer::new(VisualizerConfig::new("cam", ""), fake)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
