pub mod command;

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("layer {0} is outside the visibility range 1..=4")]
        LayerOutOfRange(i32),
        #[error("shape with id {0:?} not found")]
        ShapeNotFound(String),
    }
}

pub mod scene {
    use tracing::debug;
    use vdraw_core::document::{Document, ShapeKind, ShapeRef};
    use vdraw_core::geometry::{Bounds2D, ContainMode, Geometry, Point2};

    use crate::errors::EngineError;

    pub const FIRST_LAYER: i32 = 1;
    pub const LAST_LAYER: i32 = 4;

    /// 命中测试的单条结果，`feature` 为从 1 开始的特征点序号。
    #[derive(Debug, Clone, PartialEq)]
    pub struct Hit {
        pub id: String,
        pub kind: ShapeKind,
        pub feature: usize,
    }

    /// 面向消费方的只读查询层：持有解析完成的文档与图层可见性，
    /// 运行时状态不会写回文档。
    #[derive(Debug)]
    pub struct Scene {
        document: Document,
        hidden_layers: [bool; 4],
    }

    impl Scene {
        pub fn new() -> Self {
            Self::with_document(Document::new())
        }

        pub fn with_document(document: Document) -> Self {
            Self {
                document,
                hidden_layers: [false; 4],
            }
        }

        #[inline]
        pub fn document(&self) -> &Document {
            &self.document
        }

        fn layer_slot(layer: i32) -> Result<usize, EngineError> {
            if (FIRST_LAYER..=LAST_LAYER).contains(&layer) {
                Ok((layer - FIRST_LAYER) as usize)
            } else {
                Err(EngineError::LayerOutOfRange(layer))
            }
        }

        pub fn set_layer_visible(&mut self, layer: i32, visible: bool) -> Result<(), EngineError> {
            let slot = Self::layer_slot(layer)?;
            self.hidden_layers[slot] = !visible;
            debug!(layer, visible, "图层可见性已更新");
            Ok(())
        }

        /// 未分组（0）或超出 1-4 的图层始终可见。
        pub fn is_layer_visible(&self, layer: i32) -> bool {
            match Self::layer_slot(layer) {
                Ok(slot) => !self.hidden_layers[slot],
                Err(_) => true,
            }
        }

        pub fn visible_shapes(&self) -> impl Iterator<Item = ShapeRef<'_>> {
            self.document
                .shapes()
                .filter(|shape| self.is_layer_visible(shape.layer()))
        }

        /// 对所有可见图形做命中测试，按文档顺序返回全部命中。
        pub fn hits(&self, point: Point2, radius: f64) -> Vec<Hit> {
            self.visible_shapes()
                .filter_map(|shape| {
                    shape
                        .nearest_feature_index(point, radius)
                        .map(|feature| Hit {
                            id: shape.id().to_string(),
                            kind: shape.kind(),
                            feature,
                        })
                })
                .collect()
        }

        pub fn shapes_within(&self, area: &Bounds2D, mode: ContainMode) -> Vec<ShapeRef<'_>> {
            self.visible_shapes()
                .filter(|shape| shape.contained_in(area, mode))
                .collect()
        }

        pub fn visible_bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            let mut has = false;
            for shape in self.visible_shapes() {
                bounds.include_bounds(&shape.bounding_rect());
                has = true;
            }
            if has { Some(bounds) } else { None }
        }

        pub fn shape(&self, id: &str) -> Result<ShapeRef<'_>, EngineError> {
            self.document
                .find(id)
                .ok_or_else(|| EngineError::ShapeNotFound(id.to_string()))
        }
    }

    impl Default for Scene {
        fn default() -> Self {
            Self::new()
        }
    }

}
