pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示。页面坐标系 x 向右、y 向下增长。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_points(start: Point2, end: Point2) -> Self {
            Self(end.0 - start.0)
        }

        #[inline]
        pub fn length(self) -> f64 {
            self.0.length()
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    /// 轴对齐矩形，既用作图形包围盒，也用作框选/包含测试的查询区域。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn new(min: Point2, max: Point2) -> Self {
            Self { min, max }
        }

        /// 由左上角与宽高构造，负的宽高会被规整为正向范围。
        pub fn from_origin_size(origin: Point2, width: f64, height: f64) -> Self {
            let far = origin.translate(Vector2::new(width, height));
            Self {
                min: Point2::from_vec(origin.as_vec2().min(far.as_vec2())),
                max: Point2::from_vec(origin.as_vec2().max(far.as_vec2())),
            }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }

        pub fn include_bounds(&mut self, other: &Bounds2D) {
            if other.is_empty() {
                return;
            }
            self.include_point(other.min);
            self.include_point(other.max);
        }

        /// 边界上的点视为包含在内。
        #[inline]
        pub fn contains_point(&self, point: Point2) -> bool {
            point.x() >= self.min.x()
                && point.x() <= self.max.x()
                && point.y() >= self.min.y()
                && point.y() <= self.max.y()
        }

        /// 依次返回左上、右上、右下、左下四个角点。
        pub fn corners(&self) -> [Point2; 4] {
            [
                self.min,
                Point2::new(self.max.x(), self.min.y()),
                self.max,
                Point2::new(self.min.x(), self.max.y()),
            ]
        }
    }

    /// 包含测试模式：任一特征点落入即可，或全部特征点都须落入。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub enum ContainMode {
        #[default]
        Any,
        All,
    }

    /// 所有图形共享的几何能力。
    pub trait Geometry {
        /// 完整包住图形的轴对齐矩形，每次调用都重新计算。
        fn bounding_rect(&self) -> Bounds2D;

        /// 图形的特征点，顺序固定且有语义（例如线段的起点在前、终点在后）。
        fn feature_points(&self) -> Vec<Point2>;

        fn contained_in(&self, area: &Bounds2D, mode: ContainMode) -> bool {
            let points = self.feature_points();
            match mode {
                ContainMode::Any => points.iter().any(|point| area.contains_point(*point)),
                ContainMode::All => points.iter().all(|point| area.contains_point(*point)),
            }
        }

        /// 以每个特征点为中心、边长 `2 * radius` 的正方形做命中测试，返回从 1 开始的序号。
        ///
        /// 扫描全部特征点并保留最后一个命中者，而不是距离最近者：多个正方形同时覆盖
        /// `point` 时，`feature_points()` 中序号最大的那个胜出。
        fn nearest_feature_index(&self, point: Point2, radius: f64) -> Option<usize> {
            let mut matched = None;
            for (index, feature) in self.feature_points().into_iter().enumerate() {
                let square = Bounds2D::new(
                    Point2::new(feature.x() - radius, feature.y() - radius),
                    Point2::new(feature.x() + radius, feature.y() + radius),
                );
                if square.contains_point(point) {
                    matched = Some(index + 1);
                }
            }
            matched
        }
    }
}

pub mod style {
    use std::fmt;
    use std::str::FromStr;

    use serde::{Deserialize, Serialize};

    use crate::errors::StyleError;

    /// 命名颜色。DSL 与 JSON 中都以名称出现，解析时不区分大小写。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum Color {
        Transparent,
        Black,
        White,
        Red,
        Green,
        Blue,
        Yellow,
        Cyan,
        Magenta,
        Orange,
        Purple,
        Brown,
        Pink,
        Gray,
        DarkGray,
        LightGray,
        DarkRed,
        DarkGreen,
        DarkBlue,
        Navy,
    }

    const NAMED_COLORS: [(&str, Color); 20] = [
        ("Transparent", Color::Transparent),
        ("Black", Color::Black),
        ("White", Color::White),
        ("Red", Color::Red),
        ("Green", Color::Green),
        ("Blue", Color::Blue),
        ("Yellow", Color::Yellow),
        ("Cyan", Color::Cyan),
        ("Magenta", Color::Magenta),
        ("Orange", Color::Orange),
        ("Purple", Color::Purple),
        ("Brown", Color::Brown),
        ("Pink", Color::Pink),
        ("Gray", Color::Gray),
        ("DarkGray", Color::DarkGray),
        ("LightGray", Color::LightGray),
        ("DarkRed", Color::DarkRed),
        ("DarkGreen", Color::DarkGreen),
        ("DarkBlue", Color::DarkBlue),
        ("Navy", Color::Navy),
    ];

    impl Color {
        pub fn name(self) -> &'static str {
            NAMED_COLORS
                .iter()
                .find(|(_, color)| *color == self)
                .map(|(name, _)| *name)
                .unwrap_or("Transparent")
        }
    }

    impl FromStr for Color {
        type Err = StyleError;

        fn from_str(raw: &str) -> Result<Self, Self::Err> {
            let wanted = raw.trim();
            NAMED_COLORS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
                .map(|(_, color)| *color)
                .ok_or_else(|| StyleError::UnknownColor(wanted.to_string()))
        }
    }

    impl fmt::Display for Color {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name())
        }
    }

    /// 九宫格文字对齐，两字母代码首字母为垂直方向（T/C/B），次字母为水平方向（L/C/R）。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub enum TextAlign {
        TopLeft,
        TopCenter,
        TopRight,
        MiddleLeft,
        #[default]
        MiddleCenter,
        MiddleRight,
        BottomLeft,
        BottomCenter,
        BottomRight,
    }

    impl TextAlign {
        pub fn from_code(code: &str) -> Result<Self, StyleError> {
            let align = match code.trim().to_ascii_uppercase().as_str() {
                "TL" => TextAlign::TopLeft,
                "TC" => TextAlign::TopCenter,
                "TR" => TextAlign::TopRight,
                "CL" => TextAlign::MiddleLeft,
                "CC" => TextAlign::MiddleCenter,
                "CR" => TextAlign::MiddleRight,
                "BL" => TextAlign::BottomLeft,
                "BC" => TextAlign::BottomCenter,
                "BR" => TextAlign::BottomRight,
                _ => {
                    return Err(StyleError::UnknownCode {
                        kind: "text alignment",
                        code: code.trim().to_string(),
                    });
                }
            };
            Ok(align)
        }

        pub fn code(self) -> &'static str {
            match self {
                TextAlign::TopLeft => "TL",
                TextAlign::TopCenter => "TC",
                TextAlign::TopRight => "TR",
                TextAlign::MiddleLeft => "CL",
                TextAlign::MiddleCenter => "CC",
                TextAlign::MiddleRight => "CR",
                TextAlign::BottomLeft => "BL",
                TextAlign::BottomCenter => "BC",
                TextAlign::BottomRight => "BR",
            }
        }
    }

    /// 线端样式。渲染层只认识其中一部分时，由渲染层自行决定降级方式。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub enum CapStyle {
        #[default]
        None,
        HollowCircle,
        FilledCircle,
        HollowSquare,
        FilledSquare,
        HollowArrow,
        FilledArrow,
    }

    impl CapStyle {
        pub fn from_code(code: &str) -> Result<Self, StyleError> {
            let cap = match code.trim().to_ascii_uppercase().as_str() {
                "NO" => CapStyle::None,
                "CO" => CapStyle::HollowCircle,
                "CF" => CapStyle::FilledCircle,
                "SO" => CapStyle::HollowSquare,
                "SF" => CapStyle::FilledSquare,
                "AO" => CapStyle::HollowArrow,
                "AF" => CapStyle::FilledArrow,
                _ => {
                    return Err(StyleError::UnknownCode {
                        kind: "cap style",
                        code: code.trim().to_string(),
                    });
                }
            };
            Ok(cap)
        }

        pub fn code(self) -> &'static str {
            match self {
                CapStyle::None => "NO",
                CapStyle::HollowCircle => "CO",
                CapStyle::FilledCircle => "CF",
                CapStyle::HollowSquare => "SO",
                CapStyle::FilledSquare => "SF",
                CapStyle::HollowArrow => "AO",
                CapStyle::FilledArrow => "AF",
            }
        }
    }
}

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum StyleError {
        #[error("unknown color name \"{0}\"")]
        UnknownColor(String),
        #[error("unknown {kind} code \"{code}\"")]
        UnknownCode { kind: &'static str, code: String },
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum ShapeError {
        #[error("{shape} {dimension} must be positive and finite, got {value}")]
        NonPositiveExtent {
            shape: &'static str,
            dimension: &'static str,
            value: f64,
        },
        #[error("line thickness must be positive and finite, got {0}")]
        InvalidThickness(f64),
    }
}

pub mod document {
    use std::fmt;

    use serde::{Deserialize, Serialize};

    use crate::errors::ShapeError;
    use crate::geometry::{Bounds2D, Geometry, Point2, Vector2};
    use crate::style::{CapStyle, Color, TextAlign};

    fn positive_extent(
        shape: &'static str,
        dimension: &'static str,
        value: f64,
    ) -> Result<f64, ShapeError> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(ShapeError::NonPositiveExtent {
                shape,
                dimension,
                value,
            })
        }
    }

    /// 每个图形共有的属性。反序列化时与构建器一样校验线宽。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(try_from = "CommonRecord")]
    pub struct ShapeCommon {
        pub id: String,
        /// 可见性分组（1-4），0 表示未分组。
        pub layer: i32,
        pub text: String,
        pub text_align: TextAlign,
        pub line_thickness: f64,
        pub line_color: Color,
        pub fill_color: Color,
    }

    #[derive(Deserialize)]
    struct CommonRecord {
        id: String,
        #[serde(default)]
        layer: i32,
        #[serde(default)]
        text: String,
        #[serde(default)]
        text_align: TextAlign,
        line_thickness: f64,
        line_color: Color,
        fill_color: Color,
    }

    impl TryFrom<CommonRecord> for ShapeCommon {
        type Error = ShapeError;

        fn try_from(record: CommonRecord) -> Result<Self, Self::Error> {
            let mut common = ShapeCommon {
                id: record.id,
                layer: record.layer,
                text: record.text,
                text_align: record.text_align,
                line_color: record.line_color,
                fill_color: record.fill_color,
                ..ShapeCommon::default()
            };
            common.set_line_thickness(record.line_thickness)?;
            Ok(common)
        }
    }

    impl ShapeCommon {
        pub fn new(id: impl Into<String>) -> Self {
            Self {
                id: id.into(),
                ..Self::default()
            }
        }

        pub fn set_line_thickness(&mut self, thickness: f64) -> Result<(), ShapeError> {
            if thickness.is_finite() && thickness > 0.0 {
                self.line_thickness = thickness;
                Ok(())
            } else {
                Err(ShapeError::InvalidThickness(thickness))
            }
        }
    }

    impl Default for ShapeCommon {
        fn default() -> Self {
            Self {
                id: String::new(),
                layer: 0,
                text: String::new(),
                text_align: TextAlign::default(),
                line_thickness: 1.0,
                line_color: Color::Black,
                fill_color: Color::Transparent,
            }
        }
    }

    /// 矩形，以左上角定位；宽高在构造与反序列化时都必须为正。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(try_from = "RectRecord")]
    pub struct RectShape {
        #[serde(flatten)]
        pub common: ShapeCommon,
        location: Point2,
        width: f64,
        height: f64,
    }

    #[derive(Deserialize)]
    struct RectRecord {
        #[serde(flatten)]
        common: ShapeCommon,
        location: Point2,
        width: f64,
        height: f64,
    }

    impl TryFrom<RectRecord> for RectShape {
        type Error = ShapeError;

        fn try_from(record: RectRecord) -> Result<Self, Self::Error> {
            RectShape::new(record.common, record.location, record.width, record.height)
        }
    }

    impl RectShape {
        pub fn new(
            common: ShapeCommon,
            location: Point2,
            width: f64,
            height: f64,
        ) -> Result<Self, ShapeError> {
            Ok(Self {
                common,
                location,
                width: positive_extent("rect", "width", width)?,
                height: positive_extent("rect", "height", height)?,
            })
        }

        #[inline]
        pub fn location(&self) -> Point2 {
            self.location
        }

        #[inline]
        pub fn width(&self) -> f64 {
            self.width
        }

        #[inline]
        pub fn height(&self) -> f64 {
            self.height
        }

        #[inline]
        pub fn top_left(&self) -> Point2 {
            self.location
        }

        #[inline]
        pub fn top_right(&self) -> Point2 {
            self.location.translate(Vector2::new(self.width, 0.0))
        }

        #[inline]
        pub fn bottom_right(&self) -> Point2 {
            self.location
                .translate(Vector2::new(self.width, self.height))
        }

        #[inline]
        pub fn bottom_left(&self) -> Point2 {
            self.location.translate(Vector2::new(0.0, self.height))
        }
    }

    impl Geometry for RectShape {
        fn bounding_rect(&self) -> Bounds2D {
            Bounds2D::from_origin_size(self.location, self.width, self.height)
        }

        fn feature_points(&self) -> Vec<Point2> {
            vec![
                self.top_left(),
                self.top_right(),
                self.bottom_right(),
                self.bottom_left(),
            ]
        }
    }

    /// 线段特征点的语义：序号 1 为起点，2 为终点。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Endpoint {
        Start,
        End,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct LineShape {
        #[serde(flatten)]
        pub common: ShapeCommon,
        pub start: Point2,
        pub end: Point2,
        #[serde(default)]
        pub start_cap: CapStyle,
        #[serde(default)]
        pub end_cap: CapStyle,
    }

    impl LineShape {
        pub fn new(common: ShapeCommon, start: Point2, end: Point2) -> Self {
            Self {
                common,
                start,
                end,
                start_cap: CapStyle::None,
                end_cap: CapStyle::None,
            }
        }

        pub fn with_caps(mut self, start_cap: CapStyle, end_cap: CapStyle) -> Self {
            self.start_cap = start_cap;
            self.end_cap = end_cap;
            self
        }

        /// 把 `nearest_feature_index` 的结果映射回起点/终点。
        pub fn endpoint(index: usize) -> Option<Endpoint> {
            match index {
                1 => Some(Endpoint::Start),
                2 => Some(Endpoint::End),
                _ => None,
            }
        }

        #[inline]
        pub fn length(&self) -> f64 {
            Vector2::from_points(self.start, self.end).length()
        }
    }

    impl Geometry for LineShape {
        fn bounding_rect(&self) -> Bounds2D {
            let mut bounds = Bounds2D::empty();
            bounds.include_point(self.start);
            bounds.include_point(self.end);
            bounds
        }

        fn feature_points(&self) -> Vec<Point2> {
            vec![self.start, self.end]
        }
    }

    /// 椭圆，以中心和外接宽高描述。DSL 不产生椭圆，只能经由 API 或 JSON 构建。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(try_from = "EllipseRecord")]
    pub struct EllipseShape {
        #[serde(flatten)]
        pub common: ShapeCommon,
        center: Point2,
        width: f64,
        height: f64,
    }

    #[derive(Deserialize)]
    struct EllipseRecord {
        #[serde(flatten)]
        common: ShapeCommon,
        center: Point2,
        width: f64,
        height: f64,
    }

    impl TryFrom<EllipseRecord> for EllipseShape {
        type Error = ShapeError;

        fn try_from(record: EllipseRecord) -> Result<Self, Self::Error> {
            EllipseShape::new(record.common, record.center, record.width, record.height)
        }
    }

    impl EllipseShape {
        pub fn new(
            common: ShapeCommon,
            center: Point2,
            width: f64,
            height: f64,
        ) -> Result<Self, ShapeError> {
            Ok(Self {
                common,
                center,
                width: positive_extent("ellipse", "width", width)?,
                height: positive_extent("ellipse", "height", height)?,
            })
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            self.center
        }

        #[inline]
        pub fn width(&self) -> f64 {
            self.width
        }

        #[inline]
        pub fn height(&self) -> f64 {
            self.height
        }
    }

    impl Geometry for EllipseShape {
        fn bounding_rect(&self) -> Bounds2D {
            let half = Vector2::new(self.width * 0.5, self.height * 0.5);
            let min = self.center.translate(Vector2::new(-half.x(), -half.y()));
            let max = self.center.translate(half);
            Bounds2D::new(min, max)
        }

        /// 上、右、下、左四个极值点（从顶部开始顺时针）。
        fn feature_points(&self) -> Vec<Point2> {
            let half_w = self.width * 0.5;
            let half_h = self.height * 0.5;
            vec![
                self.center.translate(Vector2::new(0.0, -half_h)),
                self.center.translate(Vector2::new(half_w, 0.0)),
                self.center.translate(Vector2::new(0.0, half_h)),
                self.center.translate(Vector2::new(-half_w, 0.0)),
            ]
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ShapeKind {
        Rect,
        Line,
        Ellipse,
    }

    impl fmt::Display for ShapeKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let name = match self {
                ShapeKind::Rect => "rect",
                ShapeKind::Line => "line",
                ShapeKind::Ellipse => "ellipse",
            };
            f.write_str(name)
        }
    }

    /// 图形的封闭联合，构建器产出它，再由 `Document::add_shape` 归入对应集合。
    #[derive(Debug, Clone, PartialEq)]
    pub enum Shape {
        Rect(RectShape),
        Line(LineShape),
        Ellipse(EllipseShape),
    }

    impl Shape {
        pub fn view(&self) -> ShapeRef<'_> {
            match self {
                Shape::Rect(rect) => ShapeRef::Rect(rect),
                Shape::Line(line) => ShapeRef::Line(line),
                Shape::Ellipse(ellipse) => ShapeRef::Ellipse(ellipse),
            }
        }

        #[inline]
        pub fn common(&self) -> &ShapeCommon {
            self.view().common()
        }

        #[inline]
        pub fn kind(&self) -> ShapeKind {
            self.view().kind()
        }
    }

    impl Geometry for Shape {
        fn bounding_rect(&self) -> Bounds2D {
            self.view().bounding_rect()
        }

        fn feature_points(&self) -> Vec<Point2> {
            self.view().feature_points()
        }
    }

    /// 文档中图形的借用视图。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum ShapeRef<'a> {
        Rect(&'a RectShape),
        Line(&'a LineShape),
        Ellipse(&'a EllipseShape),
    }

    impl<'a> ShapeRef<'a> {
        pub fn common(self) -> &'a ShapeCommon {
            match self {
                ShapeRef::Rect(rect) => &rect.common,
                ShapeRef::Line(line) => &line.common,
                ShapeRef::Ellipse(ellipse) => &ellipse.common,
            }
        }

        #[inline]
        pub fn id(self) -> &'a str {
            &self.common().id
        }

        #[inline]
        pub fn layer(self) -> i32 {
            self.common().layer
        }

        pub fn kind(self) -> ShapeKind {
            match self {
                ShapeRef::Rect(_) => ShapeKind::Rect,
                ShapeRef::Line(_) => ShapeKind::Line,
                ShapeRef::Ellipse(_) => ShapeKind::Ellipse,
            }
        }
    }

    impl Geometry for ShapeRef<'_> {
        fn bounding_rect(&self) -> Bounds2D {
            match self {
                ShapeRef::Rect(rect) => rect.bounding_rect(),
                ShapeRef::Line(line) => line.bounding_rect(),
                ShapeRef::Ellipse(ellipse) => ellipse.bounding_rect(),
            }
        }

        fn feature_points(&self) -> Vec<Point2> {
            match self {
                ShapeRef::Rect(rect) => rect.feature_points(),
                ShapeRef::Line(line) => line.feature_points(),
                ShapeRef::Ellipse(ellipse) => ellipse.feature_points(),
            }
        }
    }

    /// 页面元数据，尺寸以虚拟单位计；`units` 只用于显示。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Page {
        pub width: f64,
        pub height: f64,
        pub grid: f64,
        pub snap: f64,
        #[serde(default)]
        pub units: String,
        pub scale: u32,
    }

    impl Default for Page {
        fn default() -> Self {
            Self {
                width: 297.0,
                height: 210.0,
                grid: 10.0,
                snap: 1.0,
                units: String::new(),
                scale: 1,
            }
        }
    }

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Document {
        #[serde(default)]
        page: Page,
        #[serde(default)]
        rects: Vec<RectShape>,
        #[serde(default)]
        lines: Vec<LineShape>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        ellipses: Vec<EllipseShape>,
    }

    impl Document {
        pub fn new() -> Self {
            Self::default()
        }

        #[inline]
        pub fn page(&self) -> &Page {
            &self.page
        }

        pub fn set_page(&mut self, page: Page) {
            self.page = page;
        }

        pub fn add_rect(&mut self, rect: RectShape) {
            self.rects.push(rect);
        }

        pub fn add_line(&mut self, line: LineShape) {
            self.lines.push(line);
        }

        pub fn add_ellipse(&mut self, ellipse: EllipseShape) {
            self.ellipses.push(ellipse);
        }

        pub fn add_shape(&mut self, shape: Shape) {
            match shape {
                Shape::Rect(rect) => self.add_rect(rect),
                Shape::Line(line) => self.add_line(line),
                Shape::Ellipse(ellipse) => self.add_ellipse(ellipse),
            }
        }

        #[inline]
        pub fn rects(&self) -> &[RectShape] {
            &self.rects
        }

        #[inline]
        pub fn lines(&self) -> &[LineShape] {
            &self.lines
        }

        #[inline]
        pub fn ellipses(&self) -> &[EllipseShape] {
            &self.ellipses
        }

        /// 依次遍历矩形、线段、椭圆。
        pub fn shapes(&self) -> impl Iterator<Item = ShapeRef<'_>> {
            self.rects
                .iter()
                .map(ShapeRef::Rect)
                .chain(self.lines.iter().map(ShapeRef::Line))
                .chain(self.ellipses.iter().map(ShapeRef::Ellipse))
        }

        #[inline]
        pub fn shape_count(&self) -> usize {
            self.rects.len() + self.lines.len() + self.ellipses.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.shape_count() == 0
        }

        /// 标识符并不要求唯一，返回遍历顺序中的第一个匹配。
        pub fn find(&self, id: &str) -> Option<ShapeRef<'_>> {
            self.shapes().find(|shape| shape.id() == id)
        }

        pub fn bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            let mut has = false;
            for shape in self.shapes() {
                bounds.include_bounds(&shape.bounding_rect());
                has = true;
            }
            if has { Some(bounds) } else { None }
        }
    }

}
