use crate::ingest::normalize::Payloads;
use crate::ingest::profile::ProfileKind;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

const DEMO_NEWS: [(&str, &str, &str, &str, &str, &str); 6] = [
    (
        "腾讯Q3财报超预期，游戏收入同比增长20%",
        "腾讯控股公布第三季度财报，游戏业务收入实现强劲增长，超出市场预期。《王者荣耀》和《和平精英》继续保持领先地位。",
        "Reuters",
        "股市表现",
        "China",
        "https://example.com/news1",
    ),
    (
        "微信推出AI驱动的企业服务新功能",
        "腾讯微信平台推出创新AI功能，旨在增强企业通信和客户服务能力，助力企业数字化转型。",
        "TechCrunch",
        "AI技术",
        "Global",
        "https://example.com/news2",
    ),
    (
        "腾讯云扩大国际布局，新增东南亚和欧洲数据中心",
        "腾讯云宣布扩张计划，在东南亚和欧洲新建数据中心，与AWS和Azure展开竞争。",
        "Bloomberg",
        "云服务",
        "Global",
        "https://example.com/news3",
    ),
    (
        "中国监管机构批准腾讯多款新游戏",
        "中国游戏监管机构批准腾讯多款新游戏上线，显示监管环境趋于友好。",
        "CNBC",
        "政策监管",
        "China",
        "https://example.com/news4",
    ),
    (
        "腾讯音乐在竞争中实现用户增长",
        "尽管面临激烈竞争，腾讯音乐娱乐报告用户稳定增长和改进的变现策略。",
        "Financial Times",
        "数字内容",
        "China",
        "https://example.com/news5",
    ),
    (
        "腾讯投资元宇宙初创企业，着眼未来增长",
        "腾讯宣布对多家元宇宙和VR技术初创企业进行战略投资，作为长期增长战略的一部分。",
        "TechNode",
        "元宇宙",
        "Global",
        "https://example.com/news6",
    ),
];

pub fn demo_payloads(kind: ProfileKind, now: DateTime<Utc>) -> Option<Payloads> {
    match kind {
        ProfileKind::Tencent => Some(tencent_demo(now)),
        ProfileKind::Market | ProfileKind::Etf => None,
    }
}

fn tencent_demo(now: DateTime<Utc>) -> Payloads {
    let stamp = now.to_rfc3339_opts(SecondsFormat::Secs, true);

    let news: Vec<Value> = DEMO_NEWS
        .iter()
        .enumerate()
        .map(|(idx, (title, description, source, category, country, url))| {
            json!({
                "id": idx + 1,
                "title": title,
                "description": description,
                "url": url,
                "source": source,
                "published_at": stamp,
                "category": category,
                "country": country,
            })
        })
        .collect();

    let key_factors: Vec<Value> = DEMO_NEWS
        .iter()
        .map(|(title, _, _, category, _, _)| {
            json!({"type": "positive", "category": category, "title": title})
        })
        .collect();

    let distribution: serde_json::Map<String, Value> = DEMO_NEWS
        .iter()
        .map(|(_, _, _, category, _, _)| (category.to_string(), json!(1)))
        .collect();

    let mut payloads = Payloads::new();
    payloads.insert(
        "news",
        json!({
            "updated_at": stamp,
            "total_count": DEMO_NEWS.len(),
            "news": news,
        }),
    );
    payloads.insert(
        "analysis",
        json!({
            "temperature_score": 72.5,
            "sentiment": "乐观",
            "sentiment_emoji": "😊",
            "investment_advice": {
                "overall_rating": "强烈看好",
                "risk_level": "中等风险",
                "recommendation": "建议增持",
                "detailed_analysis": "基于最新6条新闻分析，腾讯整体表现积极（积极新闻4条，占比66.7%）。多项业务板块展现强劲增长势头，市场情绪乐观，投资价值凸显。游戏业务持续增长，云服务扩张顺利，监管环境改善，为未来发展奠定良好基础。",
                "key_opportunities": [
                    "游戏业务持续增长，新游戏上线表现强劲",
                    "云服务市场份额扩大，企业数字化转型需求旺盛",
                    "社交平台用户活跃度提升，广告收入增长潜力大",
                    "AI技术应用落地，为各业务线赋能",
                    "监管环境改善，政策风险降低"
                ],
                "key_risks": [
                    "市场竞争加剧需要持续创新投入",
                    "国际业务扩张面临地缘政治风险"
                ],
                "action_items": [
                    "建议在当前价位适度增持，目标仓位可提升至15-20%",
                    "重点关注季度财报，特别是游戏和云服务收入",
                    "设置止盈点，建议在上涨20%后分批获利了结",
                    "长期持有，关注3-6个月的业绩表现"
                ]
            },
            "key_factors": key_factors,
            "positive_count": 5,
            "negative_count": 1,
            "neutral_count": 0,
            "categories_distribution": distribution,
        }),
    );
    payloads
}
