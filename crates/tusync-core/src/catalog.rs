//! 데이터셋 카탈로그.
//!
//! 상류 API의 각 데이터셋에 대해 대상 테이블, 컬럼 집합(이름/타입/NULL 허용
//! 여부), 고유키 튜플을 기술하는 정적 스키마 기술자를 제공합니다.
//!
//! 저장 계층은 런타임 리플렉션 대신 이 기술자를 사용해 수신 레코드를
//! 필터링합니다. 고유키 컬럼은 구조상 NULL을 허용하지 않으며, 키 값이
//! 없는 레코드는 쓰기 전에 버려집니다.
//!
//! `id` / `created_at` / `updated_at` 같은 자동 생성 컬럼은 기술자에
//! 포함하지 않습니다. 쓰기 가능한 필드 집합 = 기술자의 필드 전체입니다.

/// 컬럼 타입 분류.
///
/// 저장소 바인딩 시 JSON 값을 어떤 SQL 타입으로 변환할지 결정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 문자열 컬럼 (코드, 날짜 문자열, 명칭 등)
    Text,
    /// 정수 컬럼 (건수, 횟수 등)
    Integer,
    /// 고정소수점 컬럼 (가격, 금액, 비율 등 — API 원본 정밀도 유지)
    Decimal,
}

/// 단일 컬럼 기술자.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// 컬럼 이름 (상류 API 필드명과 동일)
    pub name: &'static str,
    /// 컬럼 타입
    pub kind: FieldKind,
    /// NULL 허용 여부 (고유키 컬럼은 항상 false)
    pub nullable: bool,
}

/// NULL 허용 컬럼.
const fn col(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        nullable: true,
    }
}

/// 필수(NOT NULL) 컬럼. 고유키 컬럼은 모두 이걸로 선언합니다.
const fn req(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        nullable: false,
    }
}

use FieldKind::{Decimal, Integer, Text};

/// 데이터셋 스키마 기술자.
#[derive(Debug, Clone, Copy)]
pub struct DatasetSchema {
    /// 데이터셋 이름. 동기화 원장(sync_record)의 sync_type 기본값으로도
    /// 사용됩니다.
    pub name: &'static str,
    /// 대상 테이블 이름
    pub table: &'static str,
    /// 상류 API 인터페이스 이름
    pub api_name: &'static str,
    /// 쓰기 가능한 컬럼 목록
    pub fields: &'static [FieldSpec],
    /// 고유키 튜플 (1~3개 컬럼, 테이블의 UNIQUE 제약과 일치해야 함)
    pub unique_key: &'static [&'static str],
}

impl DatasetSchema {
    /// 이름으로 컬럼 기술자를 찾습니다.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// 고유키 컬럼인지 확인합니다.
    pub fn is_key(&self, name: &str) -> bool {
        self.unique_key.iter().any(|key| *key == name)
    }

    /// 필수(NOT NULL) 컬럼 이름 목록.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|f| !f.nullable).map(|f| f.name)
    }

    /// 고유키가 아닌 컬럼 이름 목록.
    pub fn non_key_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|f| !self.is_key(f.name))
            .map(|f| f.name)
    }
}

/// 주식 기본 목록 (stock_basic).
pub static STOCK_LIST: DatasetSchema = DatasetSchema {
    name: "stock_list",
    table: "stock_list",
    api_name: "stock_basic",
    fields: &[
        req("ts_code", Text),
        col("symbol", Text),
        col("name", Text),
        col("area", Text),
        col("industry", Text),
        col("fullname", Text),
        col("enname", Text),
        col("cnspell", Text),
        col("market", Text),
        col("exchange", Text),
        col("curr_type", Text),
        col("list_status", Text),
        col("list_date", Text),
        col("delist_date", Text),
        col("is_hs", Text),
        col("act_name", Text),
        col("act_ent_type", Text),
    ],
    unique_key: &["ts_code"],
};

/// 전십대 주주 (top10_holders).
pub static STOCK_HOLDER: DatasetSchema = DatasetSchema {
    name: "stock_holder",
    table: "stock_holder",
    api_name: "top10_holders",
    fields: &[
        req("ts_code", Text),
        req("ann_date", Text),
        col("end_date", Text),
        req("holder_name", Text),
        col("hold_amount", Decimal),
        col("hold_ratio", Decimal),
        col("hold_float_ratio", Decimal),
        col("hold_change", Decimal),
        col("holder_type", Text),
    ],
    unique_key: &["ts_code", "ann_date", "holder_name"],
};

/// 핫머니(유명 개인자금) 명부 (hm_list).
pub static STOCK_HOT_MONEY: DatasetSchema = DatasetSchema {
    name: "stock_hot_money",
    table: "stock_hot_money",
    api_name: "hm_list",
    fields: &[req("name", Text), col("orgs", Text)],
    unique_key: &["name"],
};

/// 일봉 시세 (daily).
pub static STOCK_DAILY: DatasetSchema = DatasetSchema {
    name: "stock_daily",
    table: "stock_daily",
    api_name: "daily",
    fields: &[
        req("ts_code", Text),
        req("trade_date", Text),
        col("open", Decimal),
        col("high", Decimal),
        col("low", Decimal),
        col("close", Decimal),
        col("pre_close", Decimal),
        col("change", Decimal),
        col("pct_chg", Decimal),
        col("vol", Decimal),
        col("amount", Decimal),
    ],
    unique_key: &["ts_code", "trade_date"],
};

/// 일별 매집 분포 (cyq_chips). 가격 레벨별 한 행이므로 가격이 키에 포함됩니다.
pub static STOCK_CHIP: DatasetSchema = DatasetSchema {
    name: "stock_chip",
    table: "stock_chip",
    api_name: "cyq_chips",
    fields: &[
        req("ts_code", Text),
        req("trade_date", Text),
        req("price", Decimal),
        col("percent", Decimal),
    ],
    unique_key: &["ts_code", "trade_date", "price"],
};

/// 기술 지표 (stk_factor).
pub static STOCK_TECH_FACTOR: DatasetSchema = DatasetSchema {
    name: "stock_tech_factor",
    table: "stock_tech_factor",
    api_name: "stk_factor",
    fields: &[
        req("ts_code", Text),
        req("trade_date", Text),
        col("close", Decimal),
        col("open", Decimal),
        col("high", Decimal),
        col("low", Decimal),
        col("pre_close", Decimal),
        col("change", Decimal),
        col("pct_change", Decimal),
        col("vol", Decimal),
        col("amount", Decimal),
        col("adj_factor", Decimal),
        col("open_hfq", Decimal),
        col("open_qfq", Decimal),
        col("close_hfq", Decimal),
        col("close_qfq", Decimal),
        col("high_hfq", Decimal),
        col("high_qfq", Decimal),
        col("low_hfq", Decimal),
        col("low_qfq", Decimal),
        col("pre_close_hfq", Decimal),
        col("pre_close_qfq", Decimal),
        col("macd_dif", Decimal),
        col("macd_dea", Decimal),
        col("macd", Decimal),
        col("kdj_k", Decimal),
        col("kdj_d", Decimal),
        col("kdj_j", Decimal),
        col("rsi_6", Decimal),
        col("rsi_12", Decimal),
        col("rsi_24", Decimal),
        col("boll_upper", Decimal),
        col("boll_mid", Decimal),
        col("boll_lower", Decimal),
        col("cci", Decimal),
    ],
    unique_key: &["ts_code", "trade_date"],
};

/// 기술 지표 프로 (stk_factor_pro).
///
/// 상류 테이블은 수백 개의 복권(복원가) 지표 컬럼을 갖지만, 저장 대상은
/// 가격/복권가/밸류에이션/회전율 핵심 부분집합입니다. 기술자에 없는
/// 수신 필드는 저장 계층에서 걸러집니다.
pub static STOCK_TECH_FACTOR_PRO: DatasetSchema = DatasetSchema {
    name: "stock_tech_factor_pro",
    table: "stock_tech_factor_pro",
    api_name: "stk_factor_pro",
    fields: &[
        req("ts_code", Text),
        req("trade_date", Text),
        col("open", Decimal),
        col("open_hfq", Decimal),
        col("open_qfq", Decimal),
        col("high", Decimal),
        col("high_hfq", Decimal),
        col("high_qfq", Decimal),
        col("low", Decimal),
        col("low_hfq", Decimal),
        col("low_qfq", Decimal),
        col("close", Decimal),
        col("close_hfq", Decimal),
        col("close_qfq", Decimal),
        col("pre_close", Decimal),
        col("change", Decimal),
        col("pct_chg", Decimal),
        col("vol", Decimal),
        col("amount", Decimal),
        col("turnover_rate", Decimal),
        col("turnover_rate_f", Decimal),
        col("volume_ratio", Decimal),
        col("pe", Decimal),
        col("pe_ttm", Decimal),
        col("pb", Decimal),
        col("ps", Decimal),
        col("ps_ttm", Decimal),
        col("dv_ratio", Decimal),
        col("dv_ttm", Decimal),
        col("total_share", Decimal),
        col("float_share", Decimal),
        col("free_share", Decimal),
        col("total_mv", Decimal),
        col("circ_mv", Decimal),
        col("adj_factor", Decimal),
        col("downdays", Decimal),
        col("updays", Decimal),
    ],
    unique_key: &["ts_code", "trade_date"],
};

/// 개별 종목 자금 흐름 (moneyflow).
pub static STOCK_MONEY_FLOW: DatasetSchema = DatasetSchema {
    name: "stock_money_flow",
    table: "stock_money_flow",
    api_name: "moneyflow",
    fields: &[
        req("ts_code", Text),
        req("trade_date", Text),
        col("buy_sm_vol", Integer),
        col("buy_sm_amount", Decimal),
        col("sell_sm_vol", Integer),
        col("sell_sm_amount", Decimal),
        col("buy_md_vol", Integer),
        col("buy_md_amount", Decimal),
        col("sell_md_vol", Integer),
        col("sell_md_amount", Decimal),
        col("buy_lg_vol", Integer),
        col("buy_lg_amount", Decimal),
        col("sell_lg_vol", Integer),
        col("sell_lg_amount", Decimal),
        col("buy_elg_vol", Integer),
        col("buy_elg_amount", Decimal),
        col("sell_elg_vol", Integer),
        col("sell_elg_amount", Decimal),
        col("net_mf_vol", Integer),
        col("net_mf_amount", Decimal),
    ],
    unique_key: &["ts_code", "trade_date"],
};

/// THS 개별 종목 자금 흐름 (moneyflow_ths).
pub static STOCK_MONEY_FLOW_THS: DatasetSchema = DatasetSchema {
    name: "stock_money_flow_ths",
    table: "stock_money_flow_ths",
    api_name: "moneyflow_ths",
    fields: &[
        req("ts_code", Text),
        req("trade_date", Text),
        col("name", Text),
        col("pct_change", Decimal),
        col("latest", Decimal),
        col("net_amount", Decimal),
        col("net_d5_amount", Decimal),
        col("buy_lg_amount", Decimal),
        col("buy_lg_amount_rate", Decimal),
        col("buy_md_amount", Decimal),
        col("buy_md_amount_rate", Decimal),
        col("buy_sm_amount", Decimal),
        col("buy_sm_amount_rate", Decimal),
    ],
    unique_key: &["ts_code", "trade_date"],
};

/// DC 개별 종목 자금 흐름 (moneyflow_dc).
pub static STOCK_MONEY_FLOW_DC: DatasetSchema = DatasetSchema {
    name: "stock_money_flow_dc",
    table: "stock_money_flow_dc",
    api_name: "moneyflow_dc",
    fields: &[
        req("ts_code", Text),
        req("trade_date", Text),
        col("buy_elg_amount", Decimal),
        col("buy_elg_amount_rate", Decimal),
        col("sell_elg_amount", Decimal),
        col("sell_elg_amount_rate", Decimal),
        col("buy_lg_amount", Decimal),
        col("buy_lg_amount_rate", Decimal),
        col("sell_lg_amount", Decimal),
        col("sell_lg_amount_rate", Decimal),
        col("buy_md_amount", Decimal),
        col("sell_md_amount", Decimal),
        col("buy_sm_amount", Decimal),
        col("sell_sm_amount", Decimal),
        col("net_mf_amount", Decimal),
    ],
    unique_key: &["ts_code", "trade_date"],
};

/// THS 콘셉트 블록 자금 흐름 (moneyflow_cnt_ths).
pub static BLOCK_THS_MONEY_FLOW: DatasetSchema = DatasetSchema {
    name: "block_ths_money_flow",
    table: "block_ths_money_flow",
    api_name: "moneyflow_cnt_ths",
    fields: &[
        req("trade_date", Text),
        req("ts_code", Text),
        col("name", Text),
        col("lead_stock", Text),
        col("close_price", Decimal),
        col("pct_change", Decimal),
        col("industry_index", Decimal),
        col("company_num", Integer),
        col("pct_change_stock", Decimal),
        col("net_buy_amount", Decimal),
        col("net_sell_amount", Decimal),
        col("net_amount", Decimal),
    ],
    unique_key: &["trade_date", "ts_code"],
};

/// THS 업종 자금 흐름 (moneyflow_ind_ths).
pub static INDUSTRY_THS_MONEY_FLOW: DatasetSchema = DatasetSchema {
    name: "industry_ths_money_flow",
    table: "industry_ths_money_flow",
    api_name: "moneyflow_ind_ths",
    fields: &[
        req("trade_date", Text),
        req("ts_code", Text),
        col("industry", Text),
        col("lead_stock", Text),
        col("close", Decimal),
        col("pct_change", Decimal),
        col("company_num", Integer),
        col("pct_change_stock", Decimal),
        col("close_price", Decimal),
        col("net_buy_amount", Decimal),
        col("net_sell_amount", Decimal),
        col("net_amount", Decimal),
    ],
    unique_key: &["trade_date", "ts_code"],
};

/// DC 콘셉트 블록 자금 흐름 (moneyflow_dc_cnt).
pub static BLOCK_DC_MONEY_FLOW: DatasetSchema = DatasetSchema {
    name: "block_dc_money_flow",
    table: "block_dc_money_flow",
    api_name: "moneyflow_dc_cnt",
    fields: &[
        req("ts_code", Text),
        req("trade_date", Text),
        col("buy_elg_amount", Decimal),
        col("buy_elg_amount_rate", Decimal),
        col("sell_elg_amount", Decimal),
        col("sell_elg_amount_rate", Decimal),
        col("buy_lg_amount", Decimal),
        col("buy_lg_amount_rate", Decimal),
        col("sell_lg_amount", Decimal),
        col("sell_lg_amount_rate", Decimal),
        col("buy_md_amount", Decimal),
        col("sell_md_amount", Decimal),
        col("buy_sm_amount", Decimal),
        col("sell_sm_amount", Decimal),
        col("net_mf_amount", Decimal),
    ],
    unique_key: &["ts_code", "trade_date"],
};

/// DC 업종 자금 흐름 (moneyflow_dc_industry).
pub static INDUSTRY_DC_MONEY_FLOW: DatasetSchema = DatasetSchema {
    name: "industry_dc_money_flow",
    table: "industry_dc_money_flow",
    api_name: "moneyflow_dc_industry",
    fields: &[
        req("ts_code", Text),
        req("trade_date", Text),
        col("buy_elg_amount", Decimal),
        col("buy_elg_amount_rate", Decimal),
        col("sell_elg_amount", Decimal),
        col("sell_elg_amount_rate", Decimal),
        col("buy_lg_amount", Decimal),
        col("buy_lg_amount_rate", Decimal),
        col("sell_lg_amount", Decimal),
        col("sell_lg_amount_rate", Decimal),
        col("buy_md_amount", Decimal),
        col("sell_md_amount", Decimal),
        col("buy_sm_amount", Decimal),
        col("sell_sm_amount", Decimal),
        col("net_mf_amount", Decimal),
    ],
    unique_key: &["ts_code", "trade_date"],
};

/// 상위 거래 종목 일별 통계 (top_list). 같은 날 복수 사유로 오를 수 있어
/// 사유가 키에 포함됩니다.
pub static STOCK_LHB_DAILY: DatasetSchema = DatasetSchema {
    name: "stock_lhb_daily",
    table: "stock_lhb_daily",
    api_name: "top_list",
    fields: &[
        req("trade_date", Text),
        req("ts_code", Text),
        col("name", Text),
        col("close", Decimal),
        col("pct_change", Decimal),
        col("turnover_rate", Decimal),
        col("amount", Decimal),
        col("l_sell", Decimal),
        col("l_buy", Decimal),
        col("l_amount", Decimal),
        col("net_amount", Decimal),
        col("net_rate", Decimal),
        col("amount_rate", Decimal),
        col("float_values", Decimal),
        req("reason", Text),
    ],
    unique_key: &["ts_code", "trade_date", "reason"],
};

/// 상위 거래 기관 내역 (top_inst).
pub static STOCK_LHB_INST: DatasetSchema = DatasetSchema {
    name: "stock_lhb_inst",
    table: "stock_lhb_inst",
    api_name: "top_inst",
    fields: &[
        req("trade_date", Text),
        req("ts_code", Text),
        req("exalter", Text),
        req("side", Text),
        col("buy", Decimal),
        col("buy_rate", Decimal),
        col("sell", Decimal),
        col("sell_rate", Decimal),
        col("net_buy", Decimal),
        col("reason", Text),
    ],
    unique_key: &["ts_code", "trade_date", "exalter", "side"],
};

/// 상·하한가 및 개장 반락 현황 (limit_list_d).
pub static STOCK_LIMIT_STATUS: DatasetSchema = DatasetSchema {
    name: "stock_limit_status",
    table: "stock_limit_status",
    api_name: "limit_list_d",
    fields: &[
        req("trade_date", Text),
        req("ts_code", Text),
        col("industry", Text),
        col("name", Text),
        col("close", Decimal),
        col("pct_chg", Decimal),
        col("amount", Decimal),
        col("limit_amount", Decimal),
        col("float_mv", Decimal),
        col("total_mv", Decimal),
        col("turnover_ratio", Decimal),
        col("fd_amount", Decimal),
        col("first_time", Text),
        col("last_time", Text),
        col("open_times", Integer),
        col("up_stat", Text),
        col("limit_times", Integer),
        col("limit", Text),
    ],
    unique_key: &["ts_code", "trade_date"],
};

/// 연속 상한가 사다리 (limit_step).
pub static STOCK_LIMIT_LADDER: DatasetSchema = DatasetSchema {
    name: "stock_limit_ladder",
    table: "stock_limit_ladder",
    api_name: "limit_step",
    fields: &[
        req("ts_code", Text),
        col("name", Text),
        req("trade_date", Text),
        col("nums", Text),
    ],
    unique_key: &["ts_code", "trade_date"],
};

/// 상한가 최강 블록 통계 (limit_cpt_list).
pub static BLOCK_LIMIT_STRONG: DatasetSchema = DatasetSchema {
    name: "block_limit_strong",
    table: "block_limit_strong",
    api_name: "limit_cpt_list",
    fields: &[
        req("ts_code", Text),
        col("name", Text),
        req("trade_date", Text),
        col("days", Integer),
        col("up_stat", Text),
        col("cons_nums", Integer),
        col("up_nums", Text),
        col("pct_chg", Decimal),
        col("rank", Text),
    ],
    unique_key: &["trade_date", "ts_code"],
};

/// 핫머니 일별 상세 (hm_detail).
pub static STOCK_HOT_MONEY_DAILY: DatasetSchema = DatasetSchema {
    name: "stock_hot_money_daily",
    table: "stock_hot_money_daily",
    api_name: "hm_detail",
    fields: &[
        req("trade_date", Text),
        req("ts_code", Text),
        col("ts_name", Text),
        col("buy_amount", Decimal),
        col("sell_amount", Decimal),
        col("net_amount", Decimal),
        req("hm_name", Text),
        col("hm_orgs", Text),
        col("tag", Text),
    ],
    unique_key: &["trade_date", "ts_code", "hm_name"],
};

/// THS 업종/콘셉트 지수 명부 (ths_index).
pub static THS_BLOCK: DatasetSchema = DatasetSchema {
    name: "ths_index",
    table: "ths_industry_and_block",
    api_name: "ths_index",
    fields: &[
        req("ts_code", Text),
        col("name", Text),
        col("count", Integer),
        col("exchange", Text),
        col("list_date", Text),
        col("type", Text),
    ],
    unique_key: &["ts_code"],
};

/// THS 블록 구성 종목 (ths_member).
pub static THS_BLOCK_DETAIL: DatasetSchema = DatasetSchema {
    name: "ths_member",
    table: "ths_industry_and_block_detail",
    api_name: "ths_member",
    fields: &[
        req("ts_code", Text),
        req("con_code", Text),
        col("con_name", Text),
        col("weight", Decimal),
        col("in_date", Text),
        col("out_date", Text),
        col("is_new", Text),
    ],
    unique_key: &["ts_code", "con_code"],
};

/// THS 블록 일별 시세 (ths_daily).
pub static THS_BLOCK_DAILY: DatasetSchema = DatasetSchema {
    name: "ths_daily",
    table: "ths_industry_and_block_daily",
    api_name: "ths_daily",
    fields: &[
        req("ts_code", Text),
        req("trade_date", Text),
        col("close", Decimal),
        col("open", Decimal),
        col("high", Decimal),
        col("low", Decimal),
        col("pre_close", Decimal),
        col("avg_price", Decimal),
        col("change", Decimal),
        col("pct_change", Decimal),
        col("vol", Decimal),
        col("turnover_rate", Decimal),
        col("total_mv", Decimal),
        col("float_mv", Decimal),
    ],
    unique_key: &["ts_code", "trade_date"],
};

/// DC 콘셉트 블록 명부 (dc_index). 일자별 스냅샷이라 날짜가 키에 포함됩니다.
pub static DC_BLOCK: DatasetSchema = DatasetSchema {
    name: "dc_index",
    table: "dc_industry_and_block",
    api_name: "dc_index",
    fields: &[
        req("ts_code", Text),
        req("trade_date", Text),
        col("name", Text),
        col("leading", Text),
        col("leading_code", Text),
        col("pct_change", Decimal),
        col("leading_pct", Decimal),
        col("total_mv", Decimal),
        col("turnover_rate", Decimal),
        col("up_num", Integer),
        col("down_num", Integer),
    ],
    unique_key: &["ts_code", "trade_date"],
};

/// DC 블록 구성 종목 (dc_member).
pub static DC_BLOCK_DETAIL: DatasetSchema = DatasetSchema {
    name: "dc_member",
    table: "dc_industry_and_block_detail",
    api_name: "dc_member",
    fields: &[
        req("trade_date", Text),
        req("ts_code", Text),
        req("con_code", Text),
        col("name", Text),
    ],
    unique_key: &["trade_date", "ts_code", "con_code"],
};

/// DC 블록 일별 시세 (dc_daily).
pub static DC_BLOCK_DAILY: DatasetSchema = DatasetSchema {
    name: "dc_daily",
    table: "dc_industry_and_block_daily",
    api_name: "dc_daily",
    fields: &[
        req("ts_code", Text),
        req("trade_date", Text),
        col("close", Decimal),
        col("open", Decimal),
        col("high", Decimal),
        col("low", Decimal),
        col("change", Decimal),
        col("pct_change", Decimal),
        col("vol", Decimal),
        col("amount", Decimal),
        col("swing", Decimal),
        col("turnover_rate", Decimal),
    ],
    unique_key: &["ts_code", "trade_date"],
};

/// 카탈로그 전체.
pub static DATASETS: &[&DatasetSchema] = &[
    &STOCK_LIST,
    &STOCK_HOLDER,
    &STOCK_HOT_MONEY,
    &STOCK_DAILY,
    &STOCK_CHIP,
    &STOCK_TECH_FACTOR,
    &STOCK_TECH_FACTOR_PRO,
    &STOCK_MONEY_FLOW,
    &STOCK_MONEY_FLOW_THS,
    &STOCK_MONEY_FLOW_DC,
    &BLOCK_THS_MONEY_FLOW,
    &INDUSTRY_THS_MONEY_FLOW,
    &BLOCK_DC_MONEY_FLOW,
    &INDUSTRY_DC_MONEY_FLOW,
    &STOCK_LHB_DAILY,
    &STOCK_LHB_INST,
    &STOCK_LIMIT_STATUS,
    &STOCK_LIMIT_LADDER,
    &BLOCK_LIMIT_STRONG,
    &STOCK_HOT_MONEY_DAILY,
    &THS_BLOCK,
    &THS_BLOCK_DETAIL,
    &THS_BLOCK_DAILY,
    &DC_BLOCK,
    &DC_BLOCK_DETAIL,
    &DC_BLOCK_DAILY,
];

/// 데이터셋 이름으로 스키마를 찾습니다.
pub fn by_name(name: &str) -> Option<&'static DatasetSchema> {
    DATASETS.iter().copied().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_keys_are_required_fields() {
        // 고유키 컬럼은 반드시 기술자에 존재하고 NOT NULL이어야 한다
        for schema in DATASETS {
            for key in schema.unique_key {
                let field = schema
                    .field(key)
                    .unwrap_or_else(|| panic!("{}: 키 컬럼 {} 누락", schema.name, key));
                assert!(
                    !field.nullable,
                    "{}: 키 컬럼 {}은 NOT NULL이어야 함",
                    schema.name, key
                );
            }
        }
    }

    #[test]
    fn test_dataset_names_unique() {
        let mut names: Vec<_> = DATASETS.iter().map(|s| s.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn test_by_name_lookup() {
        assert_eq!(by_name("stock_daily").unwrap().api_name, "daily");
        assert_eq!(
            by_name("ths_daily").unwrap().table,
            "ths_industry_and_block_daily"
        );
        assert!(by_name("unknown").is_none());
    }

    #[test]
    fn test_non_key_fields_excludes_keys() {
        let non_key: Vec<_> = STOCK_DAILY.non_key_fields().collect();
        assert!(!non_key.contains(&"ts_code"));
        assert!(!non_key.contains(&"trade_date"));
        assert!(non_key.contains(&"close"));
    }
}
