use chrono::{NaiveDate, NaiveDateTime, NaiveTime, ParseResult, Timelike};

// Convert "地铁2号线(徐泾东-浦东国际机场)" to "2号线", and "地铁4号线(内圈(宜山路-宜山路))" to "4号线", etc.
pub fn get_line_id<'a>(line_name: &'a str, prefix: &str) -> &'a str {
    let line = line_name.split(['(', '（']).next().unwrap_or(line_name).trim();
    line.strip_prefix(prefix).unwrap_or(line).trim()
}

// Split a fare-system station string such as "2号线人民广场" into ("2号线", "人民广场").
// Without a delimiter the line is empty and the whole string is the station.
pub fn split_fare_station(station: &str, delimiter: char) -> (&str, &str) {
    match station.find(delimiter) {
        Some(pos) => station.split_at(pos + delimiter.len_utf8()),
        None => ("", station),
    }
}

pub fn parse_date(s: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
}

pub fn parse_time(s: &str) -> ParseResult<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M:%S")
}

pub fn parse_datetime(date: &str, time: &str) -> ParseResult<NaiveDateTime> {
    Ok(parse_date(date)?.and_time(parse_time(time)?))
}

pub fn get_time_str(time: NaiveTime) -> String {
    format!("{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second())
}

#[cfg(test)]
mod test {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn test_line_id() {
        assert_eq!(get_line_id("地铁2号线(徐泾东-浦东国际机场)", "地铁"), "2号线");
        assert_eq!(get_line_id("地铁4号线(内圈(宜山路-宜山路))", "地铁"), "4号线");
        assert_eq!(get_line_id("地铁5号线支线(东川路-奉贤新城)", "地铁"), "5号线支线");
        assert_eq!(get_line_id("浦江线", "地铁"), "浦江线");
        assert_eq!(get_line_id("Line A (north)", ""), "Line A");
    }

    #[test]
    fn test_split_fare_station() {
        assert_eq!(split_fare_station("2号线人民广场", '线'), ("2号线", "人民广场"));
        assert_eq!(split_fare_station("浦江线沈杜公路", '线'), ("浦江线", "沈杜公路"));
        assert_eq!(split_fare_station("人民广场", '线'), ("", "人民广场"));
    }

    #[test]
    fn test_parse_time() {
        let time = parse_time("8:30:05").expect("valid time");
        assert_eq!((time.hour(), time.minute(), time.second()), (8, 30, 5));
        assert_eq!(get_time_str(time), "08:30:05");
        assert!(parse_time("8:30").is_err());
        assert!(parse_datetime("2015-04-01", "25:00:00").is_err());
    }
}
