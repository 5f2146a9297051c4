//! User-facing strings shown by the dashboard panels.

pub const PROFILE_REQUIRED: &str = "사용자 정보를 먼저 입력해주세요.";

pub const SCHEDULE_TITLE: &str = "☁️ 이날의 시간표 ☁️";
pub const SCHEDULE_LOADING: &str = "시간표 불러오는 중...";
pub const SCHEDULE_NO_DATA: &str = "선택한 날짜에는 등록된 시간표가 없어요.";

pub const MENU_TITLE: &str = "☁️ 오늘의 급식 ☁️";
pub const MENU_LOADING: &str = "급식 정보를 불러오는 중...";
pub const MENU_NO_DATA: &str = "선택한 날짜에는 급식 정보가 없어요.";

pub const PREV_DAY: &str = "< 이전 날짜";
pub const NEXT_DAY: &str = "다음 날짜 >";

pub const ROUTE_TITLE: &str = "등하교 경로";
pub const ROUTE_INPUT_PLACEHOLDER: &str = "출발지 도로명 주소 (예: 서울 강남구 테헤란로 134)";
pub const ROUTE_BUTTON: &str = "학교까지 길찾기";
pub const ROUTE_BUTTON_BUSY: &str = "경로 검색 중...";
pub const ROUTE_EMPTY_ADDRESS: &str = "출발지를 입력해주세요.";
pub const ROUTE_SCHOOL_MISSING: &str =
    "학교 정보가 설정되지 않았습니다. 설정 페이지에서 학교를 선택해주세요.";
pub const ROUTE_ADDRESS_NOT_FOUND: &str = "입력하신 출발지 주소를 찾을 수 없습니다.";
pub const ROUTE_NOT_FOUND: &str = "경로를 찾을 수 없습니다.";
pub const ROUTE_GEOMETRY_MISSING: &str = "경로 데이터가 추출되지 않았습니다.";
pub const ROUTE_AUTH_FAILED: &str = "API 인증에 실패했습니다. API 키를 확인해주세요.";
pub const ROUTE_UNKNOWN: &str = "경로 검색 중 알 수 없는 오류 발생.";
pub const MAP_LOADING: &str = "지도를 불러오는 중입니다. 잠시만 기다려주세요...";

pub const SETUP_TITLE: &str = "사용자 정보 입력";
pub const SETUP_SAVED: &str = "사용자 정보가 저장되었습니다!";
pub const SETUP_REQUIRED: &str = "모든 필수 항목을 입력해주세요.";
pub const SETUP_INVALID_SCHOOL: &str = "유효하지 않은 학교입니다.";
pub const SETUP_INVALID_NUMBER: &str = "학년, 반, 번호는 유효한 숫자여야 합니다.";

/// "API 요청 실패: 500 message"
pub fn request_failed(status: u16, detail: &str) -> String {
    format!("API 요청 실패: {status} {detail}").trim_end().to_string()
}

/// "예상 소요 시간: 약 15분"
pub fn route_duration(minutes: u32) -> String {
    format!("예상 소요 시간: 약 {minutes}분")
}

/// "총 거리: 약 3.4km"
pub fn route_distance(km: f64) -> String {
    format!("총 거리: 약 {km:.1}km")
}

/// "내 집: <address>"
pub fn home_suggestion(address: &str) -> String {
    format!("내 집: {address}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_trims_empty_detail() {
        assert_eq!(request_failed(500, ""), "API 요청 실패: 500");
        assert_eq!(
            request_failed(502, "bad gateway"),
            "API 요청 실패: 502 bad gateway"
        );
    }

    #[test]
    fn test_route_summary_lines() {
        assert_eq!(route_duration(15), "예상 소요 시간: 약 15분");
        assert_eq!(route_distance(3.4), "총 거리: 약 3.4km");
        assert_eq!(route_distance(12.0), "총 거리: 약 12.0km");
    }
}
