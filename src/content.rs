//! Keyword → icon lookup for custom items
//!
//! A static, ordered table; the first entry with a matching keyword wins.
//! Used to suggest icons for player-typed stressors and to break a sentence
//! into several items.

use crate::sim::level::{
    Color, CustomItem, InteractionMode, Language, LevelDescriptor, MusicTheme, VisualTheme,
};

/// Upper bound on items produced from one prompt
pub const MAX_PROMPT_ITEMS: usize = 8;

/// Color for items pulled in by association
const ASSOCIATED_COLOR: &str = "#F59E0B";

/// (keywords, icon). English keys are lowercase.
static STRESSORS: &[(&[&str], &str)] = &[
    // Work
    (&["boss", "manager", "ceo", "老板", "领导", "经理", "上司"], "👹"),
    (&["meeting", "call", "zoom", "会议", "开会", "周报"], "📢"),
    (&["deadline", "ddl", "urgent", "asap", "截止", "加急"], "⏰"),
    (&["email", "spam", "邮件", "消息", "回复"], "📧"),
    (&["ppt", "slides", "presentation", "汇报", "方案"], "📉"),
    (&["bug", "error", "crash", "故障", "报错", "exception"], "🪲"),
    (&["code", "python", "dev", "代码", "编程", "需求", "git"], "💻"),
    (&["salary", "money", "pay", "工资", "奖金", "钱", "穷"], "💸"),
    (&["fired", "layoff", "quit", "裁员", "辞职", "失业"], "📦"),
    (&["overtime", "996", "tired", "work", "加班", "好累", "通宵"], "🌚"),
    (&["client", "customer", "甲方", "客户", "改稿"], "😤"),
    (&["kpi", "okr", "review", "绩效", "考核"], "📊"),
    (&["interview", "resume", "面试", "简历", "找工作"], "👔"),
    (&["printer", "jam", "打印机", "卡纸"], "🖨️"),
    (&["excel", "spreadsheet", "表格", "数据"], "📑"),
    (&["colleague", "coworker", "同事", "猪队友", "甩锅"], "🤡"),
    (&["commute", "subway", "traffic", "通勤", "地铁", "堵车"], "🚌"),
    (&["monday", "周一", "星期一"], "📅"),
    (&["friday", "weekend", "周五", "周末"], "🎉"),
    // Life
    (&["rent", "bill", "房租", "房贷", "账单", "水电"], "🧾"),
    (&["chore", "clean", "家务", "打扫", "洗碗"], "🧹"),
    (&["laundry", "clothes", "洗衣服", "袜子"], "🧺"),
    (&["noise", "loud", "neighbor", "snore", "噪音", "装修", "邻居", "呼噜"], "🔊"),
    (&["repair", "broken", "leak", "维修", "漏水", "坏了"], "🔧"),
    (&["cockroach", "pest", "蟑螂", "老鼠", "蚊子"], "🪳"),
    (&["delivery", "package", "快递", "外卖"], "📦"),
    (&["weather", "rain", "天气", "下雨", "humid"], "🌧️"),
    (&["queue", "排队", "插队"], "🚶"),
    // Health
    (&["insomnia", "awake", "失眠", "睡不着", "熬夜"], "💤"),
    (&["sick", "flu", "fever", "生病", "发烧", "感冒"], "🤒"),
    (&["weight", "diet", "减肥", "长胖"], "⚖️"),
    (&["bald", "hair", "脱发", "秃头", "发际线"], "👨‍🦲"),
    (&["dentist", "tooth", "牙疼", "智齿"], "🦷"),
    (&["hospital", "doctor", "医院", "看病"], "🏥"),
    (&["neck", "back pain", "腰疼", "颈椎"], "🦴"),
    // Relationships
    (&["breakup", "divorce", "前任", "分手", "离婚"], "💔"),
    (&["lonely", "single", "单身", "孤独"], "🐕"),
    (&["fight", "argue", "吵架", "冷战"], "💢"),
    (&["husband", "wife", "partner", "老公", "老婆", "对象"], "👫"),
    (&["parents", "mom", "dad", "nag", "父母", "催婚", "唠叨"], "👪"),
    (&["baby", "kid", "child", "孩子", "带娃", "哭闹"], "🍼"),
    (&["ghosted", "ignore", "不回", "已读", "拉黑"], "👻"),
    // Tech
    (&["wifi", "slow", "lag", "断网", "卡顿", "网速"], "📶"),
    (&["battery", "phone", "手机", "没电"], "🪫"),
    (&["password", "login", "密码", "验证码"], "🔒"),
    (&["update", "loading", "更新", "重启", "转圈"], "⏳"),
    (&["scam", "fraud", "诈骗", "骗子"], "🤥"),
    (&["server", "down", "崩了", "服务器"], "🔥"),
    // School
    (&["exam", "test", "考试", "挂科", "考研"], "📝"),
    (&["homework", "study", "作业", "论文", "复习"], "📚"),
    (&["teacher", "professor", "老师", "教授", "答辩"], "👩‍🏫"),
    (&["math", "calculus", "数学", "高数"], "➗"),
    // Other
    (&["stupid", "idiot", "dumb", "傻", "蠢"], "🥴"),
    (&["reject", "deny", "拒绝", "驳回"], "🙅"),
    (&["shit", "crap", "屎", "恶心"], "💩"),
    (&["fear", "scary", "anxiety", "害怕", "焦虑", "烦躁"], "😱"),
    (&["debt", "loan", "credit", "欠款", "信用卡", "花呗"], "💳"),
    // Happy
    (&["food", "hungry", "美食", "火锅", "奶茶"], "🍔"),
    (&["beer", "wine", "干杯"], "🍺"),
    (&["game", "switch", "游戏", "上分"], "🎮"),
    (&["cat", "dog", "pet", "猫", "狗", "宠物"], "🐱"),
    (&["music", "song", "音乐", "唱歌"], "🎵"),
    (&["travel", "trip", "beach", "旅行", "度假"], "✈️"),
    (&["coffee", "latte", "咖啡"], "☕"),
    (&["movie", "film", "电影", "追剧"], "🎬"),
];

/// Icons for text nothing matched, indexed by length
static FALLBACK_ICONS: &[&str] = &[
    "👾", "💥", "💢", "💣", "🗯️", "🧱", "🎱", "🚧", "🌪️", "🔥", "🥊", "🔨", "🗿", "🦂", "🕸️",
];

/// Keywords that expand into several related items
static ASSOCIATIONS: &[(&str, &[(&str, &str)])] = &[
    ("呼噜", &[("失眠", "💤"), ("烦躁", "😤"), ("噪音", "🔊"), ("黑眼圈", "🐼")]),
    ("snore", &[("Insomnia", "💤"), ("Annoyed", "😤"), ("Noise", "🔊")]),
    ("老公", &[("做家务", "🧹"), ("臭袜子", "🧦"), ("打游戏", "🎮")]),
    ("husband", &[("Chores", "🧹"), ("Socks", "🧦")]),
    ("加班", &[("脱发", "👨‍🦲"), ("颈椎病", "🦴"), ("外卖", "🥡")]),
    ("overtime", &[("Hair Loss", "👨‍🦲"), ("Back Pain", "🦴")]),
    ("带娃", &[("辅导作业", "📝"), ("哭闹", "😭"), ("碎钞机", "💸")]),
    ("kid", &[("Homework", "📝"), ("Crying", "😭"), ("Money", "💸")]),
];

/// Generic items added when a prompt matches nothing
static PROMPT_FILLERS: &[&str] = &["烦躁", "压力", "Stress", "Noise"];

static HAPPY_KEYWORDS: &[&str] = &[
    "happy", "joy", "love", "fun", "good", "快乐", "开心", "爱", "棒", "爽", "摸鱼", "holiday",
    "vacation", "money", "rich",
];

/// Suggest an icon for a player-typed label
pub fn suggest_icon(text: &str) -> &'static str {
    let lower = text.trim().to_lowercase();

    if !lower.is_empty() {
        for (keys, icon) in STRESSORS {
            let hit = keys.iter().any(|key| {
                lower.contains(key) || (key.chars().count() > 1 && key.contains(lower.as_str()))
            });
            if hit {
                return *icon;
            }
        }
    }

    if ["?", "？", "what", "什么"].iter().any(|m| lower.contains(m)) {
        return "❓";
    }
    if ["!", "！", "fuc", "cao"].iter().any(|m| lower.contains(m)) {
        return "🤬";
    }
    FALLBACK_ICONS[text.chars().count() % FALLBACK_ICONS.len()]
}

/// Break a sentence into up to eight custom items
///
/// Every table keyword found in the prompt becomes an item, followed by its
/// associated items. Texts are unique.
pub fn expand_prompt(prompt: &str) -> Vec<CustomItem> {
    let lower = prompt.to_lowercase();
    let mut items: Vec<CustomItem> = Vec::new();
    let seen = |items: &[CustomItem], text: &str| items.iter().any(|i| i.label == text);

    for (keys, icon) in STRESSORS {
        for key in keys.iter().filter(|k| lower.contains(*k)) {
            let text: String = if key.chars().count() > 4 {
                key.chars().take(6).collect()
            } else {
                key.to_string()
            };
            if seen(&items, &text) {
                continue;
            }
            items.push(CustomItem::new(format!("auto-{text}"), text.as_str(), *icon));

            for (assoc_key, related) in ASSOCIATIONS {
                if !(key.contains(assoc_key) || assoc_key.contains(key)) {
                    continue;
                }
                for (label, icon) in related.iter() {
                    if seen(&items, label) {
                        continue;
                    }
                    let mut item = CustomItem::new(format!("assoc-{label}"), *label, *icon);
                    if let Some(color) = Color::from_hex(ASSOCIATED_COLOR) {
                        item = item.with_color(color);
                    }
                    items.push(item);
                }
            }
        }
    }

    if items.is_empty() {
        let head: String = prompt.chars().take(8).collect();
        items.push(CustomItem::new("fallback", head, suggest_icon(prompt)));
        for filler in PROMPT_FILLERS {
            items.push(CustomItem::new(
                format!("filler-{filler}"),
                *filler,
                suggest_icon(filler),
            ));
        }
    }

    items.truncate(MAX_PROMPT_ITEMS);
    items
}

/// Build a level for a free-text prompt. Items come from `expand_prompt`.
pub fn level_from_prompt(prompt: &str, language: Language) -> LevelDescriptor {
    let lower = prompt.to_lowercase();
    let happy = HAPPY_KEYWORDS.iter().any(|k| lower.contains(k));
    let zh = language == Language::Zh;

    let words: &[&str] = match (happy, zh) {
        (true, true) => &["爽!", "开心", "好耶"],
        (true, false) => &["Yay!", "Nice", "Cool"],
        (false, true) => &["滚!", "走开!", "拜拜"],
        (false, false) => &["NO!", "BYE", "GONE"],
    };

    LevelDescriptor {
        label: if zh { "AI 定制关卡" } else { "AI Custom Level" }.to_string(),
        interaction: if happy {
            InteractionMode::Capture
        } else {
            InteractionMode::Destroy
        },
        theme: if happy {
            VisualTheme::Underwater
        } else {
            VisualTheme::Destruction
        },
        tempo_bpm: if happy { 120 } else { 160 },
        music: if happy {
            MusicTheme::Arcade
        } else {
            MusicTheme::HeavyMetal
        },
        impact_words: words.iter().map(|w| w.to_string()).collect(),
        items: Vec::new(),
    }
}
