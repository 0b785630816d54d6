//! 图纸描述语言：逐行预处理、切分字段、分派语句并构建图形。
//!
//! 每一行独立处理，出错的行只在错误日志中留下一条带行号的记录，不影响后续行。

use tracing::{debug, warn};
use vdraw_core::document::{
    Document, LineShape, Page, RectShape, Shape, ShapeCommon, ShapeKind,
};
use vdraw_core::geometry::Point2;
use vdraw_core::style::{CapStyle, Color, TextAlign};

use crate::errors::{RowError, StatementError};
use crate::expr::{SymbolTable, evaluate};

const COMMENT_MARKER: &str = "//";
const DEFAULT_SIGIL: char = '$';

/// 去掉注释与空行。返回 `None` 表示整行跳过。
pub fn preprocess_line(line: &str) -> Option<&str> {
    if line.trim().is_empty() {
        return None;
    }
    match line.find(COMMENT_MARKER) {
        Some(0) => None,
        Some(pos) => {
            let kept = line[..pos].trim_end();
            if kept.trim_start().is_empty() {
                None
            } else {
                Some(kept)
            }
        }
        None => Some(line),
    }
}

/// 切分后的单条语句：主语句 `lhs=rhs` 加上按顺序排列的元素参数。
#[derive(Debug, Clone, PartialEq)]
pub struct Statement<'a> {
    pub lhs: Option<&'a str>,
    pub rhs: &'a str,
    params: Vec<(String, &'a str)>,
}

impl<'a> Statement<'a> {
    #[inline]
    pub fn param(&self, key: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| *value)
    }

    /// 先按名称查找，找不到再退回到位置键。
    pub fn named_or_positional(&self, key: &str, position: usize) -> Option<&'a str> {
        self.param(key)
            .or_else(|| self.param(&position.to_string()))
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &'a str)> + '_ {
        self.params.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

/// 把一行拆成主语句与参数。第一个 `:` 之前是主语句，之后是逗号分隔的参数；
/// 没有 `=` 的参数以此前已收集的不同参数个数作为键，同名参数后者覆盖前者。
pub fn tokenize(line: &str) -> Statement<'_> {
    let (head, body) = match line.split_once(':') {
        Some((head, body)) => (head, Some(body)),
        None => (line, None),
    };

    let (lhs, rhs) = match head.split_once('=') {
        Some((lhs, rhs)) => (Some(lhs.trim()), rhs.trim()),
        None => (None, head.trim()),
    };

    let mut params: Vec<(String, &str)> = Vec::new();
    let fields = body
        .into_iter()
        .flat_map(|body| body.split(','))
        .map(str::trim)
        .filter(|field| !field.is_empty());
    for field in fields {
        let (key, value) = match field.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), value.trim()),
            None => (params.len().to_string(), field),
        };
        match params.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => params.push((key, value)),
        }
    }

    Statement { lhs, rhs, params }
}

/// 会话级默认样式，由 `$xx=` 语句修改，后续未显式指定的图形读取当时的值。
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDefaults {
    pub fill_color: Color,
    pub line_color: Color,
    pub line_thickness: f64,
    pub text_align: TextAlign,
    pub start_cap: CapStyle,
    pub end_cap: CapStyle,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        let common = ShapeCommon::default();
        Self {
            fill_color: common.fill_color,
            line_color: common.line_color,
            line_thickness: common.line_thickness,
            text_align: common.text_align,
            start_cap: CapStyle::None,
            end_cap: CapStyle::None,
        }
    }
}

impl StyleDefaults {
    fn common(&self, id: &str) -> ShapeCommon {
        ShapeCommon {
            id: id.to_string(),
            layer: 0,
            text: String::new(),
            text_align: self.text_align,
            line_thickness: self.line_thickness,
            line_color: self.line_color,
            fill_color: self.fill_color,
        }
    }
}

/// 一次解析会话的全部可变状态。多个文档并行解析时各自持有独立的会话。
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub symbols: SymbolTable,
    pub defaults: StyleDefaults,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}

/// 单条语句成功执行后的效果，主要用于日志与测试。
#[derive(Debug, Clone, PartialEq)]
pub enum StatementEffect {
    PageSet,
    ShapeAdded { kind: ShapeKind, id: String },
    DefaultUpdated(&'static str),
    SymbolAssigned { name: String, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Page,
    Rect,
    Line,
}

impl Keyword {
    fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("page") {
            Some(Keyword::Page)
        } else if raw.eq_ignore_ascii_case("rect") {
            Some(Keyword::Rect)
        } else if raw.eq_ignore_ascii_case("line") {
            Some(Keyword::Line)
        } else {
            None
        }
    }
}

/// 分派一条语句：关键字构建实体，`$` 前缀更新默认样式，其余视为用户标量赋值。
///
/// 图形只在全部字段都成功后才写入文档。
pub fn process_statement(
    statement: &Statement<'_>,
    session: &mut Session,
    document: &mut Document,
) -> Result<StatementEffect, StatementError> {
    if let Some(keyword) = Keyword::parse(statement.rhs) {
        return match keyword {
            Keyword::Page => {
                let page = build_page(statement, &session.symbols, document.page())?;
                document.set_page(page);
                Ok(StatementEffect::PageSet)
            }
            Keyword::Rect => {
                let rect = build_rect(statement, session)?;
                Ok(add_shape(document, Shape::Rect(rect)))
            }
            Keyword::Line => {
                let line = build_line(statement, session)?;
                Ok(add_shape(document, Shape::Line(line)))
            }
        };
    }

    let Some(lhs) = statement.lhs else {
        return Err(StatementError::MalformedStatement(format!(
            "\"{}\" is neither a keyword nor an assignment",
            statement.rhs
        )));
    };

    if let Some(key) = lhs.strip_prefix(DEFAULT_SIGIL) {
        if let Some(field) = update_default(key, statement.rhs, session)? {
            return Ok(StatementEffect::DefaultUpdated(field));
        }
    }

    if lhs.is_empty() {
        return Err(StatementError::MalformedStatement(
            "assignment has no name".to_string(),
        ));
    }
    let value = evaluate(statement.rhs, &session.symbols)?;
    session.symbols.set(lhs, value);
    Ok(StatementEffect::SymbolAssigned {
        name: lhs.to_string(),
        value,
    })
}

fn add_shape(document: &mut Document, shape: Shape) -> StatementEffect {
    let effect = StatementEffect::ShapeAdded {
        kind: shape.kind(),
        id: shape.common().id.clone(),
    };
    document.add_shape(shape);
    effect
}

/// 返回 `Ok(None)` 表示键不是默认样式字段，调用方继续按用户标量处理。
fn update_default(
    key: &str,
    raw: &str,
    session: &mut Session,
) -> Result<Option<&'static str>, StatementError> {
    let defaults = &mut session.defaults;
    let field = match key.to_ascii_lowercase().as_str() {
        "fc" => {
            defaults.fill_color = raw.parse::<Color>()?;
            "fill color"
        }
        "lc" => {
            defaults.line_color = raw.parse::<Color>()?;
            "line color"
        }
        "lt" => {
            defaults.line_thickness = thickness(raw, &session.symbols)?;
            "line thickness"
        }
        "tp" => {
            defaults.text_align = TextAlign::from_code(raw)?;
            "text alignment"
        }
        "ss" => {
            defaults.start_cap = CapStyle::from_code(raw)?;
            "start cap"
        }
        "es" => {
            defaults.end_cap = CapStyle::from_code(raw)?;
            "end cap"
        }
        _ => return Ok(None),
    };
    Ok(Some(field))
}

fn thickness(raw: &str, symbols: &SymbolTable) -> Result<f64, StatementError> {
    let mut checked = ShapeCommon::default();
    checked.set_line_thickness(evaluate(raw, symbols)?)?;
    Ok(checked.line_thickness)
}

fn required<'a>(
    statement: &Statement<'a>,
    kind: &'static str,
    key: &'static str,
    position: usize,
) -> Result<&'a str, StatementError> {
    statement
        .named_or_positional(key, position)
        .ok_or(StatementError::MissingField {
            statement: kind,
            field: key,
        })
}

fn required_number(
    statement: &Statement<'_>,
    symbols: &SymbolTable,
    kind: &'static str,
    key: &'static str,
    position: usize,
) -> Result<f64, StatementError> {
    evaluate(required(statement, kind, key, position)?, symbols)
}

fn whole_number(
    raw: &str,
    field: &'static str,
    symbols: &SymbolTable,
) -> Result<i64, StatementError> {
    let value = evaluate(raw, symbols)?;
    if value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(StatementError::MalformedField {
            field,
            value: raw.to_string(),
        })
    }
}

fn positive(value: f64, what: &str) -> Result<f64, StatementError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(StatementError::Validation(format!(
            "{what} must be positive, got {value}"
        )))
    }
}

fn build_page(
    statement: &Statement<'_>,
    symbols: &SymbolTable,
    current: &Page,
) -> Result<Page, StatementError> {
    let raw_scale = required(statement, "page", "sc", 0)?;
    let scale = whole_number(raw_scale, "sc", symbols)?;
    if scale <= 0 {
        return Err(StatementError::Validation(format!(
            "page scale must be a positive whole number, got {scale}"
        )));
    }
    let grid = positive(required_number(statement, symbols, "page", "gr", 1)?, "page grid")?;
    let units = statement
        .named_or_positional("un", 2)
        .unwrap_or_default()
        .to_string();

    let mut page = Page {
        grid,
        units,
        scale: scale as u32,
        ..current.clone()
    };
    if let Some(raw) = statement.param("w") {
        page.width = positive(evaluate(raw, symbols)?, "page width")?;
    }
    if let Some(raw) = statement.param("h") {
        page.height = positive(evaluate(raw, symbols)?, "page height")?;
    }
    if let Some(raw) = statement.param("sn") {
        page.snap = positive(evaluate(raw, symbols)?, "page snap")?;
    }
    debug!(
        scale = page.scale,
        grid = page.grid,
        units = %page.units,
        "页面参数已更新"
    );
    Ok(page)
}

/// 先以会话默认值初始化公共字段，再逐项应用语句中的覆盖值。
fn build_common(
    statement: &Statement<'_>,
    session: &Session,
) -> Result<ShapeCommon, StatementError> {
    let mut common = session.defaults.common(statement.lhs.unwrap_or_default());
    if let Some(raw) = statement.param("lr") {
        common.layer = whole_number(raw, "lr", &session.symbols)? as i32;
    }
    if let Some(raw) = statement.param("tx") {
        common.text = raw.to_string();
    }
    if let Some(raw) = statement.param("lt") {
        common.set_line_thickness(evaluate(raw, &session.symbols)?)?;
    }
    if let Some(raw) = statement.param("lc") {
        common.line_color = raw.parse::<Color>()?;
    }
    if let Some(raw) = statement.param("fc") {
        common.fill_color = raw.parse::<Color>()?;
    }
    if let Some(raw) = statement.param("tp") {
        common.text_align = TextAlign::from_code(raw)?;
    }
    Ok(common)
}

fn build_rect(statement: &Statement<'_>, session: &Session) -> Result<RectShape, StatementError> {
    let common = build_common(statement, session)?;
    let symbols = &session.symbols;
    let x = required_number(statement, symbols, "rect", "x", 0)?;
    let y = required_number(statement, symbols, "rect", "y", 1)?;
    let width = required_number(statement, symbols, "rect", "w", 2)?;
    let height = required_number(statement, symbols, "rect", "h", 3)?;
    if width < 1.0 || height < 1.0 {
        return Err(StatementError::Validation(format!(
            "rect \"{}\" needs width and height of at least 1, got {width} x {height}",
            common.id
        )));
    }
    Ok(RectShape::new(common, Point2::new(x, y), width, height)?)
}

fn build_line(statement: &Statement<'_>, session: &Session) -> Result<LineShape, StatementError> {
    let common = build_common(statement, session)?;
    let symbols = &session.symbols;
    let sx = required_number(statement, symbols, "line", "sx", 0)?;
    let sy = required_number(statement, symbols, "line", "sy", 1)?;
    let ex = required_number(statement, symbols, "line", "ex", 2)?;
    let ey = required_number(statement, symbols, "line", "ey", 3)?;
    let start_cap = match statement.param("ss") {
        Some(code) => CapStyle::from_code(code)?,
        None => session.defaults.start_cap,
    };
    let end_cap = match statement.param("es") {
        Some(code) => CapStyle::from_code(code)?,
        None => session.defaults.end_cap,
    };
    let line = LineShape::new(common, Point2::new(sx, sy), Point2::new(ex, ey));
    Ok(line.with_caps(start_cap, end_cap))
}

/// 一次完整解析的结果：文档、按行号排列的错误日志，以及会话最终状态。
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub document: Document,
    pub errors: Vec<RowError>,
    pub session: Session,
}

impl ParseReport {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.session.symbols
    }
}

/// 逐行驱动解析。任何一行失败都只记录错误，循环始终继续。
#[derive(Debug, Default)]
pub struct DrawingParser {
    session: Session,
    document: Document,
    errors: Vec<RowError>,
}

impl DrawingParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// `row` 从 1 开始计数。
    pub fn feed_line(&mut self, row: usize, raw: &str) {
        let Some(line) = preprocess_line(raw) else {
            return;
        };
        let statement = tokenize(line);
        match process_statement(&statement, &mut self.session, &mut self.document) {
            Ok(effect) => debug!(row, ?effect, "语句处理完成"),
            Err(error) => {
                warn!(row, error = %error, "语句处理失败，已跳过");
                self.errors.push(RowError { row, error });
            }
        }
    }

    pub fn finish(self) -> ParseReport {
        ParseReport {
            document: self.document,
            errors: self.errors,
            session: self.session,
        }
    }
}

/// 解析整段源文本。文件层面不存在致命错误：全部行都出错时返回空文档与完整错误日志。
pub fn parse_drawing(source: &str) -> ParseReport {
    let mut parser = DrawingParser::new();
    for (index, line) in source.lines().enumerate() {
        parser.feed_line(index + 1, line);
    }
    parser.finish()
}
