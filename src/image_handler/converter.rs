//! 远程图片转换服务地址构造。
//!
//! 账户名进入路径，密钥、宽高、输出格式与原图地址全部作为 query 参数并做 URL 编码。

use super::config::ConversionService;
use super::ImageError;

pub fn conversion_url(
    service: &ConversionService,
    username: &str,
    key: &str,
    image_url: &str,
    width: u32,
    height: u32,
) -> Result<String, ImageError> {
    let endpoint = service.endpoint.replace("{username}", username);
    let mut url = reqwest::Url::parse(&endpoint)
        .map_err(|e| ImageError::InvalidFormat(format!("转换服务地址无效：{}", e)))?;

    url.query_pairs_mut()
        .append_pair("x-aio-key", key)
        .append_pair("width", &width.to_string())
        .append_pair("height", &height.to_string())
        .append_pair("output", &format!("BMP{}", service.color_depth))
        .append_pair("url", image_url);

    Ok(url.into())
}
