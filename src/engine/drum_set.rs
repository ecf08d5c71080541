// ==========================================
// 供应商库存上传 - 桶号集合运算
// ==========================================
// 职责: 桶号区间展开 / 合并查重 / 差集 / 满桶数量
// 红线: 纯函数,不持有状态
// ==========================================

use crate::domain::DrumNo;
use crate::engine::error::ReconcileError;
use std::collections::HashSet;

/// 展开桶号区间描述
///
/// # 语法
/// - `token(,token)*`,token 为单个整数或闭区间 `a-b`（要求 a <= b）
/// - 空白输入返回空集合
///
/// # 返回
/// - Ok(Vec<DrumNo>): 按书写顺序展开的桶号
/// - Err(ReconcileError::Format): 任一 token 无法解析
pub fn expand_range(spec: &str) -> Result<Vec<DrumNo>, ReconcileError> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Ok(Vec::new());
    }

    let mut drums = Vec::new();
    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(ReconcileError::format("drum range", format!("空 token: '{}'", spec)));
        }

        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_drum_no(start, token)?;
                let end = parse_drum_no(end, token)?;
                if start > end {
                    return Err(ReconcileError::format(
                        "drum range",
                        format!("区间起点大于终点: '{}'", token),
                    ));
                }
                drums.extend(start..=end);
            }
            None => drums.push(parse_drum_no(token, token)?),
        }
    }

    Ok(drums)
}

fn parse_drum_no(value: &str, token: &str) -> Result<DrumNo, ReconcileError> {
    value
        .trim()
        .parse::<DrumNo>()
        .map_err(|_| ReconcileError::format("drum range", format!("无法解析桶号: '{}'", token)))
}

/// 合并多个桶号集合并升序排列,检查重复
///
/// 重复值不剔除: 调用方始终使用返回的序列,错误仅用于上报。
///
/// # 返回
/// - (升序序列（含重复）, 若存在重复则为 Some(Duplicate),逐值列出一次)
pub fn union_checking_duplicates(sets: &[&[DrumNo]]) -> (Vec<DrumNo>, Option<ReconcileError>) {
    let mut combined: Vec<DrumNo> = sets.iter().flat_map(|s| s.iter().copied()).collect();
    combined.sort_unstable();

    let mut duplicates: Vec<DrumNo> = combined
        .windows(2)
        .filter(|pair| pair[0] == pair[1])
        .map(|pair| pair[0])
        .collect();
    duplicates.dedup();

    if duplicates.is_empty() {
        (combined, None)
    } else {
        let error = ReconcileError::Duplicate {
            context: "drum numbers".to_string(),
            duplicates,
        };
        (combined, Some(error))
    }
}

/// 差集: 保留 `set` 中不在 `remove` 里的元素,保持原顺序
pub fn subtract(set: &[DrumNo], remove: &[DrumNo]) -> Vec<DrumNo> {
    let remove: HashSet<DrumNo> = remove.iter().copied().collect();
    set.iter().copied().filter(|d| !remove.contains(d)).collect()
}

/// 满桶数量 = 桶规格 × 桶数（饱和乘法）
pub fn full_drum_quantity(drum_size: i64, drums: &[DrumNo]) -> i64 {
    drum_size.saturating_mul(drums.len() as i64)
}
