use serde::{Deserialize, Serialize};

/// 法院枚举（均为 eSAJ 系统）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Court {
    /// 阿拉戈斯州法院
    #[serde(rename = "TJAL")]
    Tjal,
    /// 塞阿拉州法院
    #[serde(rename = "TJCE")]
    Tjce,
}

impl Court {
    /// 所有已支持的法院
    pub const ALL: [Court; 2] = [Court::Tjal, Court::Tjce];

    /// 获取标准代码
    pub fn code(self) -> &'static str {
        match self {
            Court::Tjal => "TJAL",
            Court::Tjce => "TJCE",
        }
    }

    /// 预加载页面池使用的法院系统键
    pub fn court_system(self) -> &'static str {
        match self {
            Court::Tjal => "TJAL_ESAJ",
            Court::Tjce => "TJCE_ESAJ",
        }
    }

    fn host(self) -> &'static str {
        match self {
            Court::Tjal => "https://www2.tjal.jus.br",
            Court::Tjce => "https://esaj.tjce.jus.br",
        }
    }

    /// 一审查询页面地址
    pub fn first_degree_search_url(self) -> String {
        format!("{}/cpopg/open.do", self.host())
    }

    /// 二审系统根地址
    pub fn second_degree_base_url(self) -> String {
        format!("{}/cposg5", self.host())
    }
}

impl std::fmt::Display for Court {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
