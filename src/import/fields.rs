//! Header to field mapping
//!
//! Spreadsheets from different suppliers label the same concept differently ("SKU", "编号",
//! "货号"). Each canonical [`ProductField`] carries a list of keywords, and a header cell
//! matches a field when its lowercased text contains any of them. The keyword table is plain
//! data so new header variants can be added without touching the matching code.

use std::fmt;

use rustc_hash::FxHashMap;

/// A product attribute that can be read from a spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductField {
    /// Stock keeping unit
    Sku,
    /// Product name
    Name,
    /// Specification
    Spec,
    /// Unit of sale
    Unit,
    /// Platform price
    PlatformPrice,
    /// Channel price
    ChannelPrice,
    /// Retail price
    RetailPrice,
    /// Image URL
    Image,
    /// Manufacturer or brand
    Manufacturer,
    /// Category
    Category,
}

impl ProductField {
    /// Every field, in table order.
    pub const ALL: [ProductField; 10] = [
        ProductField::Sku,
        ProductField::Name,
        ProductField::Spec,
        ProductField::Unit,
        ProductField::PlatformPrice,
        ProductField::ChannelPrice,
        ProductField::RetailPrice,
        ProductField::Image,
        ProductField::Manufacturer,
        ProductField::Category,
    ];

    /// Canonical field name.
    pub const fn as_str(self) -> &'static str {
        match self {
            ProductField::Sku => "sku",
            ProductField::Name => "name",
            ProductField::Spec => "spec",
            ProductField::Unit => "unit",
            ProductField::PlatformPrice => "platformPrice",
            ProductField::ChannelPrice => "channelPrice",
            ProductField::RetailPrice => "retailPrice",
            ProductField::Image => "image",
            ProductField::Manufacturer => "manufacturer",
            ProductField::Category => "category",
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword table: canonical field to lowercase keyword substrings.
#[derive(Debug, Clone)]
pub struct HeaderKeywords {
    keywords: FxHashMap<ProductField, Vec<String>>,
}

impl HeaderKeywords {
    /// A table with no keywords; nothing will match.
    pub fn empty() -> Self {
        Self {
            keywords: FxHashMap::default(),
        }
    }

    /// Add a keyword for a field. Keywords are matched case-insensitively.
    #[must_use]
    pub fn with_keyword(mut self, field: ProductField, keyword: &str) -> Self {
        self.keywords
            .entry(field)
            .or_default()
            .push(keyword.to_lowercase());

        self
    }

    /// Add several keywords for a field.
    #[must_use]
    pub fn with_keywords(self, field: ProductField, keywords: &[&str]) -> Self {
        keywords
            .iter()
            .fold(self, |table, keyword| table.with_keyword(field, keyword))
    }

    /// Keywords registered for a field.
    pub fn keywords(&self, field: ProductField) -> &[String] {
        self.keywords
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether a header cell matches a field.
    pub fn matches(&self, field: ProductField, header: &str) -> bool {
        let header = header.to_lowercase();

        self.keywords(field)
            .iter()
            .any(|keyword| header.contains(keyword.as_str()))
    }
}

impl Default for HeaderKeywords {
    fn default() -> Self {
        Self::empty()
            .with_keywords(
                ProductField::Sku,
                &["sku", "编号", "编码", "货号", "代号", "id"],
            )
            .with_keywords(
                ProductField::Name,
                &["名称", "品名", "产品名称", "标题", "商品", "name"],
            )
            .with_keywords(
                ProductField::Spec,
                &["规格", "参数", "尺寸", "描述", "spec"],
            )
            .with_keywords(ProductField::Unit, &["单位", "计量", "unit"])
            .with_keywords(
                ProductField::PlatformPrice,
                &["平台价", "成本", "成本价", "platform"],
            )
            .with_keywords(
                ProductField::ChannelPrice,
                &["渠道价", "分销价", "经销商价", "结算价", "channel"],
            )
            .with_keywords(
                ProductField::RetailPrice,
                &["零售", "零售价", "原价", "市场价", "标价", "retail"],
            )
            .with_keywords(
                ProductField::Image,
                &["素材cdn", "素材", "图片", "图", "链接", "url", "image"],
            )
            .with_keywords(
                ProductField::Manufacturer,
                &["厂家", "品牌", "供货商", "来源"],
            )
            .with_keywords(
                ProductField::Category,
                &["分类", "类目", "类型", "分组"],
            )
    }
}

/// Column index of each field in a particular header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    columns: FxHashMap<ProductField, usize>,
}

impl FieldMapping {
    /// Map every field to the leftmost header cell that matches any of its keywords.
    pub fn from_header<S: AsRef<str>>(header: &[S], table: &HeaderKeywords) -> Self {
        let columns = ProductField::ALL
            .into_iter()
            .filter_map(|field| {
                header
                    .iter()
                    .position(|cell| table.matches(field, cell.as_ref()))
                    .map(|idx| (field, idx))
            })
            .collect();

        Self { columns }
    }

    /// Column index for a field, if its header was found.
    pub fn column(&self, field: ProductField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// Column index for a field, or -1 when the header was not found.
    pub fn index_of(&self, field: ProductField) -> isize {
        self.column(field)
            .and_then(|idx| isize::try_from(idx).ok())
            .unwrap_or(-1)
    }

    /// Fields whose header was not found.
    pub fn missing(&self) -> impl Iterator<Item = ProductField> + '_ {
        ProductField::ALL
            .into_iter()
            .filter(|field| !self.columns.contains_key(field))
    }
}
