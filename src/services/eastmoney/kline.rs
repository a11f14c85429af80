//! K线数据解析

use crate::models::KLineRecord;

/// K线字符串最少字段数
pub const KLINE_MIN_FIELDS: usize = 11;

/// 解析东方财富K线原始字符串
///
/// 格式: 日期,开盘,收盘,最高,最低,成交量,成交额,振幅,涨跌幅,涨跌额,换手率
/// 字段不足或数值无法解析的行直接跳过，不影响其他行。
pub fn parse_kline_data<S: AsRef<str>>(klines: &[S]) -> Vec<KLineRecord> {
    klines
        .iter()
        .filter_map(|line| {
            let record = parse_kline_line(line.as_ref());
            if record.is_none() {
                log::debug!("跳过无法解析的K线: {}", line.as_ref());
            }
            record
        })
        .collect()
}

fn parse_kline_line(line: &str) -> Option<KLineRecord> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < KLINE_MIN_FIELDS {
        return None;
    }

    let num = |i: usize| fields[i].parse::<f64>().ok();

    Some(KLineRecord {
        date: fields[0].to_string(),
        open: num(1)?,
        close: num(2)?,
        high: num(3)?,
        low: num(4)?,
        volume: fields[5].parse().ok()?,
        amount: num(6)?,
        amplitude: num(7)?,
        change_percent: num(8)?,
        change_amount: num(9)?,
        turnover_rate: num(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_eleven_fields() {
        let rows = parse_kline_data(&[
            "2024-01-05,160.00,158.50,161.20,157.00,123456,1956789012.00,2.63,-0.94,-1.50,0.31",
        ]);
        assert_eq!(rows.len(), 1);

        let k = &rows[0];
        assert_eq!(k.date, "2024-01-05");
        assert_eq!(k.open, 160.0);
        assert_eq!(k.close, 158.5);
        assert_eq!(k.high, 161.2);
        assert_eq!(k.low, 157.0);
        assert_eq!(k.volume, 123456);
        assert_eq!(k.amount, 1956789012.0);
        assert_eq!(k.amplitude, 2.63);
        assert_eq!(k.change_percent, -0.94);
        assert_eq!(k.change_amount, -1.5);
        assert_eq!(k.turnover_rate, 0.31);
    }

    #[test]
    fn test_short_rows_are_dropped() {
        let rows = parse_kline_data(&[
            "2024-01-05,160.00,158.50,161.20,157.00,123456,1956789012.00,2.63,-0.94,-1.50",
            "",
            "2024-01-08,158.50,159.00,160.00,157.50,100000,1500000000.00,1.58,0.32,0.50,0.25",
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "2024-01-08");
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let rows = parse_kline_data(&[
            "2024-01-05,1,2,3,4,5,6,7,8,9,10,extra,fields".to_string(),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].turnover_rate, 10.0);
    }

    #[test]
    fn test_non_numeric_rows_are_dropped() {
        let rows = parse_kline_data(&["2024-01-05,-,2,3,4,5,6,7,8,9,10"]);
        assert!(rows.is_empty());
    }
}
